use std::fs;
use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use image::{ImageFormat, RgbImage};
use predicates::prelude::*;
use rstest::*;

macro_rules! cargo_run {
    ($cmd:expr, $($args:expr),*) => {
        {
            let mut cmd = Command::cargo_bin($cmd)?;
            $(cmd.arg($args);)*
            cmd.assert()
        }
    };
}

#[fixture]
fn dataset() -> TempDir {
    let dir = TempDir::new().unwrap();
    let images: [(&str, [u8; 3]); 3] =
        [("red.png", [220, 20, 30]), ("blue.png", [10, 40, 230]), ("dark_red.png", [150, 5, 10])];
    for (name, rgb) in images {
        let img = RgbImage::from_fn(16, 12, |x, y| {
            let shade = ((x + y) % 4) as u8 * 8;
            image::Rgb([rgb[0].saturating_sub(shade), rgb[1], rgb[2].saturating_add(shade)])
        });
        img.save_with_format(dir.child(name).path(), ImageFormat::Png).unwrap();
    }
    dir.child("sub").create_dir_all().unwrap();
    RgbImage::from_pixel(8, 8, image::Rgb([0, 200, 0]))
        .save_with_format(dir.child("sub/green.png").path(), ImageFormat::Png)
        .unwrap();
    dir.child("readme.txt").write_str("not an image").unwrap();
    dir
}

#[rstest]
fn search_color_code(dataset: TempDir) -> Result<()> {
    cargo_run!("imrank", "search", "-q", dataset.path(), "red.png", "--mode", "color-code")
        .success()
        .stdout(predicate::str::starts_with("0.0000\t"))
        .stdout(predicate::str::contains("red.png"))
        .stdout(predicate::str::contains("green.png"))
        .stdout(predicate::str::contains("readme.txt").not());
    Ok(())
}

#[rstest]
fn search_with_feedback(dataset: TempDir) -> Result<()> {
    let output = cargo_run!(
        "imrank",
        "search",
        "-q",
        dataset.path(),
        "red.png",
        "--relevant",
        "dark_red.png",
        "--irrelevant",
        "blue.png",
        "--count",
        "2",
        "--output-format",
        "json"
    )
    .success()
    .get_output()
    .stdout
    .clone();

    let rows: serde_json::Value = serde_json::from_slice(&output)?;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0]["id"].as_str().unwrap().ends_with("red.png"));
    assert_eq!(rows[0]["distance"].as_f64(), Some(0.0));
    Ok(())
}

#[rstest]
fn search_unknown_image(dataset: TempDir) -> Result<()> {
    cargo_run!("imrank", "search", "-q", dataset.path(), "missing.png")
        .failure()
        .stderr(predicate::str::contains("missing.png"));
    Ok(())
}

#[rstest]
fn show_features(dataset: TempDir) -> Result<()> {
    cargo_run!("imrank", "show", "-q", dataset.path(), "green.png")
        .success()
        .stdout(predicate::str::contains("灰度级  : 1"))
        .stdout(predicate::str::contains("能量    : 1.000000"));

    let json = "--output-format=json";
    let output = cargo_run!("imrank", "show", "-q", dataset.path(), "sub/green.png", json)
        .success()
        .get_output()
        .stdout
        .clone();
    let features: serde_json::Value = serde_json::from_slice(&output)?;
    assert_eq!(features["width"], 8);
    assert_eq!(features["color_code"].as_array().unwrap().len(), 64);
    assert_eq!(features["intensity"].as_array().unwrap().len(), 25);
    Ok(())
}

#[rstest]
fn export_features(dataset: TempDir) -> Result<()> {
    let out = TempDir::new()?;
    cargo_run!("imrank", "export", "-q", dataset.path(), "-o", out.path()).success();

    out.child("features.npy").assert(predicate::path::is_file());
    let ids: Vec<String> =
        serde_json::from_str(&fs::read_to_string(out.child("images.json").path())?)?;
    assert_eq!(ids.len(), 4);
    assert!(ids.iter().any(|id| id.ends_with("sub/green.png")));
    Ok(())
}
