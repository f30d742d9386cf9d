//! Command-line and environment configuration.

use clap::Parser;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "filedrop-server")]
#[command(about = "Room-based WebSocket relay for peer file sharing", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "FILEDROP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "FILEDROP_PORT", default_value_t = 6969)]
    pub port: u16,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "FILEDROP_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_arguments_are_parsed() {
        // テスト項目: 引数で指定したホスト・ポート・ログレベルが反映される
        // given (前提条件):
        let args = [
            "filedrop-server",
            "-H",
            "127.0.0.1",
            "-p",
            "8080",
            "--log-level",
            "debug",
        ];

        // when (操作):
        let config = ServerConfig::try_parse_from(args).unwrap();

        // then (期待する結果):
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        // テスト項目: 数値でないポートはエラーになる
        // given (前提条件):
        let args = ["filedrop-server", "--port", "http"];

        // when (操作):
        let result = ServerConfig::try_parse_from(args);

        // then (期待する結果):
        assert!(result.is_err());
    }
}
