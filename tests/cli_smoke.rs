use std::io::Cursor;
use std::path::PathBuf;

#[test]
fn cli_convert_writes_svg() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let in_path = dir.join("in.png");
    let out_path = dir.join("in.svg");
    let _ = std::fs::remove_file(&out_path);

    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(&in_path, &buf).unwrap();

    let exe = std::env::var_os("CARGO_BIN_EXE_imgvert")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "imgvert.exe"
            } else {
                "imgvert"
            });
            p
        });

    let in_arg = in_path.to_string_lossy().to_string();
    let dir_arg = dir.to_string_lossy().to_string();

    let status = std::process::Command::new(exe)
        .args(["convert", "--in", in_arg.as_str(), "--format", "svg", "--out-dir"])
        .arg(dir_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    let svg = std::fs::read_to_string(&out_path).unwrap();
    assert!(svg.starts_with("<svg "));
    assert!(svg.contains("<rect"));
}

#[test]
fn cli_batch_continues_past_failures() {
    let dir = PathBuf::from("target").join("cli_smoke_batch");
    std::fs::create_dir_all(&dir).unwrap();

    let good = dir.join("good.png");
    let bad = dir.join("bad.png");
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 255, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(&good, &buf).unwrap();
    std::fs::write(&bad, b"not an image").unwrap();

    let manifest = dir.join("jobs.json");
    let jobs = serde_json::json!([
        { "input": good, "format": "jpeg", "quality": 0.8 },
        { "input": bad, "format": "png" },
    ]);
    std::fs::write(&manifest, serde_json::to_vec_pretty(&jobs).unwrap()).unwrap();

    let exe = std::env::var_os("CARGO_BIN_EXE_imgvert")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("target/debug/imgvert"));

    let manifest_arg = manifest.to_string_lossy().to_string();
    let dir_arg = dir.to_string_lossy().to_string();

    let status = std::process::Command::new(exe)
        .args(["batch", "--manifest", manifest_arg.as_str(), "--out-dir"])
        .arg(dir_arg.as_str())
        .status()
        .unwrap();

    // The bad item fails the run, but the good item still converted.
    assert!(!status.success());
    assert!(dir.join("good.jpg").exists());
}
