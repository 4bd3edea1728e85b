use indicatif::{ProgressBar, ProgressStyle};

pub fn pb_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
    )
    .expect("failed to build progress style")
}

pub fn pb_style_speed() -> ProgressStyle {
    ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {per_sec} {msg}",
    )
    .expect("failed to build progress style")
}

/// 创建进度条，`quiet` 为真时不显示
pub fn progress_bar(quiet: bool, style: ProgressStyle) -> ProgressBar {
    if quiet { ProgressBar::hidden() } else { ProgressBar::no_length().with_style(style) }
}
