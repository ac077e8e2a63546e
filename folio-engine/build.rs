//! Stamps the build time into `--version` and the startup log line

fn main() {
    let built = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", built);
}
