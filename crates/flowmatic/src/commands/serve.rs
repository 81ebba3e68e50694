//! Serve command - runs the backend proxy.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use flowmatic_proxy::{
    EnvBackend, ProxyConfig, ProxyServer, SharedBackendSource, StaticBackend,
    parse_allowed_headers,
};

use super::Context;

/// Arguments for the serve command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,

    /// Attach a permissive CORS layer
    #[arg(long)]
    pub cors: bool,
}

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    let config = build_proxy_config(&args, ctx)?;
    let mount = config.mount_path.clone();

    if !ctx.json_output {
        println!("Flowmatic backend proxy");
        println!("  Listening: {}", config.bind_addr);
        println!("  Route:     GET {}/*path", mount.trim_end_matches('/'));
        println!("  Backend:   {:?}", config.backend);
    }

    let server = ProxyServer::new(config);
    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down backend proxy");
        }
    }

    Ok(())
}

/// Merge flags and config into a proxy configuration.
fn build_proxy_config(args: &ServeArgs, ctx: &Context) -> Result<ProxyConfig> {
    let section = ctx.config.proxy_or_default();

    let bind = match args.bind {
        Some(addr) => addr,
        None => ctx.config.proxy_bind()?,
    };

    // A URL given on the command line is fixed; otherwise resolve per request.
    let backend: SharedBackendSource = match &ctx.backend_url {
        Some(url) => Arc::new(StaticBackend::new(url.clone())),
        None => {
            let mut source = EnvBackend::new(ctx.config.backend_env_var());
            if let Some(url) = ctx.config.backend_base_url() {
                source = source.with_fallback(url);
            }
            Arc::new(source)
        }
    };

    let mut config = ProxyConfig::new(bind)
        .with_backend(backend)
        .with_mount_path(section.mount_path())
        .with_cors(args.cors || section.enable_cors.unwrap_or(false));

    if let Some(names) = &section.allowed_headers {
        config = config.with_allowed_headers(parse_allowed_headers(names)?);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowmatic_config::FlowmaticConfig;
    use flowmatic_proxy::BackendSource;

    fn context(toml: &str, backend_url: Option<&str>) -> Context {
        Context {
            config: FlowmaticConfig::from_toml(toml).unwrap(),
            config_dir: None,
            backend_url: backend_url.map(str::to_string),
            json_output: false,
            verbose: false,
        }
    }

    #[test]
    fn test_defaults_from_empty_config() {
        let args = ServeArgs {
            bind: None,
            cors: false,
        };
        let config = build_proxy_config(&args, &context("", None)).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.mount_path, "/api/backend");
        assert_eq!(config.allowed_headers.len(), 5);
        assert!(!config.enable_cors);
    }

    #[test]
    fn test_config_and_flags_are_applied() {
        let toml = r#"
[backend]
base_url = "https://api.example.com"

[proxy]
bind = "0.0.0.0:9000"
mount_path = "/backend"
allowed_headers = ["authorization", "x-tenant"]
"#;
        let args = ServeArgs {
            bind: Some("127.0.0.1:4000".parse().unwrap()),
            cors: true,
        };
        let config = build_proxy_config(&args, &context(toml, None)).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:4000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.mount_path, "/backend");
        assert_eq!(config.allowed_headers.len(), 2);
        assert!(config.enable_cors);
    }

    #[test]
    fn test_flag_backend_is_static() {
        let args = ServeArgs {
            bind: None,
            cors: false,
        };
        let config =
            build_proxy_config(&args, &context("", Some("https://flag.example.com"))).unwrap();
        assert_eq!(config.backend.base_url().unwrap(), "https://flag.example.com");
    }

    #[test]
    fn test_invalid_allowed_header_is_rejected() {
        let args = ServeArgs {
            bind: None,
            cors: false,
        };
        let toml = "[proxy]\nallowed_headers = [\"not a header\"]\n";
        assert!(build_proxy_config(&args, &context(toml, None)).is_err());
    }
}
