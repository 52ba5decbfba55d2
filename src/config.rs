use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_ROOT_DIR: &str = "./assets/member";

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Directory holding one subdirectory per member
    #[arg(default_value = DEFAULT_ROOT_DIR)]
    pub root_dir: PathBuf,

    /// ONNX segmentation model (U²-Net compatible)
    #[arg(short, long, default_value = "u2net.onnx")]
    pub model_path: PathBuf,

    #[arg(short, long, default_value_t = 0)]
    pub device_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["member-silhouette"]).unwrap();
        assert_eq!(config.root_dir, PathBuf::from(DEFAULT_ROOT_DIR));
        assert_eq!(config.model_path, PathBuf::from("u2net.onnx"));
        assert_eq!(config.device_id, 0);
    }

    #[test]
    fn test_explicit_arguments() {
        let config = Config::try_parse_from([
            "member-silhouette",
            "/srv/site/assets/member",
            "--model-path",
            "models/isnet.onnx",
            "-d",
            "1",
        ])
        .unwrap();
        assert_eq!(config.root_dir, PathBuf::from("/srv/site/assets/member"));
        assert_eq!(config.model_path, PathBuf::from("models/isnet.onnx"));
        assert_eq!(config.device_id, 1);
    }
}
