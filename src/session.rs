use log::debug;

use crate::corpus::Corpus;
use crate::distance::{self, DistanceRanking, QueryMode};
use crate::error::Result;
use crate::feedback::{Relevance, RelevanceSet, WeightVector, recompute_weights};

/// 一次交互式检索会话
///
/// 图库只读；相关性判断和权重只通过 `&mut self` 修改，调用方天然串行化。
pub struct Session {
    corpus: Corpus,
    relevance: RelevanceSet,
    weights: WeightVector,
    feedback: bool,
}

impl Session {
    pub fn new(corpus: Corpus) -> Self {
        let relevance = RelevanceSet::new(corpus.len());
        let weights = WeightVector::uniform(corpus.len());
        Self { corpus, relevance, weights, feedback: false }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn relevance(&self) -> &RelevanceSet {
        &self.relevance
    }

    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    pub fn feedback_enabled(&self) -> bool {
        self.feedback
    }

    /// 开关相关反馈，关闭时立即清空已有判断
    pub fn set_feedback(&mut self, enabled: bool) {
        self.feedback = enabled;
        if !enabled {
            self.relevance.clear();
        }
    }

    pub fn record_relevance(&mut self, index: usize, relevant: bool) -> Result<()> {
        self.relevance.record(index, relevant)
    }

    /// 撤销对某张图片的判断
    pub fn unjudge(&mut self, index: usize) -> Result<()> {
        self.relevance.set(index, Relevance::Unjudged)
    }

    pub fn recompute_weights(&mut self) -> &WeightVector {
        self.weights = recompute_weights(&self.relevance, self.corpus.matrix());
        debug!("权重: {:?}", self.weights.as_slice());
        &self.weights
    }

    /// 执行查询
    ///
    /// 加权查询前先根据当前的相关判断更新权重；未开启相关反馈时，查询后清空判断。
    pub fn query(&mut self, index: usize, mode: QueryMode) -> Result<DistanceRanking> {
        self.corpus.check_index(index)?;
        if mode.is_weighted() {
            self.recompute_weights();
        }
        let ranking = distance::query(&self.corpus, index, mode, &self.weights)?;
        if !self.feedback {
            self.relevance.clear();
        }
        Ok(ranking)
    }

    pub fn query_by_id(&mut self, id: &str, mode: QueryMode) -> Result<DistanceRanking> {
        let index = self.corpus.position(id)?;
        self.query(index, mode)
    }
}
