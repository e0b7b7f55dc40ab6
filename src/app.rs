use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use tracing::info;

use crate::blog;
use crate::config;
use crate::locale;
use crate::logging;
use crate::render::Renderer;
use crate::service::{BlogService, MemoryService};
use crate::ui;

const DEMO_POSTS: usize = 45;
const DEMO_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config_file: Option<PathBuf>,
    pub server: Option<String>,
    pub log_level: Option<String>,
    pub demo: bool,
}

pub fn run(options: RunOptions) -> Result<()> {
    let mut cfg = config::load(config::LoadOptions {
        config_file: options.config_file.clone(),
        env_prefix: None,
    })
    .context("load config")?;
    if let Some(server) = options.server {
        cfg.server.base_url = server;
    }

    let level = options
        .log_level
        .unwrap_or_else(|| cfg.log.level.clone());
    logging::init(&level, cfg.log.file.as_deref()).context("initialise logging")?;

    let config_path = options.config_file.or_else(config::default_path);
    let display_path = friendly_path(config_path.as_ref());

    let renderer = Renderer::new(locale::lookup(&cfg.ui.locale), cfg.ui.timezone);

    let (service, status): (Arc<dyn BlogService>, String) = if options.demo {
        let newest = Utc::now() - Duration::minutes(10);
        let service = MemoryService::seeded(DEMO_POSTS, newest, DEMO_PAGE_SIZE);
        info!(posts = DEMO_POSTS, "starting with the in-memory demo blog");
        (
            Arc::new(service),
            "Demo blog. Nothing you publish leaves this session.".to_string(),
        )
    } else {
        let client = blog::Client::new(blog::ClientConfig {
            base_url: cfg.server.base_url.clone(),
            user_agent: cfg.server.user_agent.clone(),
            username: cfg.server.username.clone(),
            password: cfg.server.password.clone(),
            timeout: Some(cfg.server.timeout),
            http_client: None,
        })
        .context("create blog client")?;
        let status = if cfg.server.username.is_empty() {
            format!(
                "Reading {}. Run `cares login` or edit {} to publish.",
                client.base_url(),
                display_path
            )
        } else {
            format!("Connected to {} as {}.", client.base_url(), cfg.server.username)
        };
        info!(base_url = %client.base_url(), "starting");
        (Arc::new(client), status)
    };

    let mut model = ui::Model::new(ui::Options {
        service,
        renderer,
        placeholder: cfg.ui.placeholder.clone(),
        status_message: status,
    });
    model.run()
}

/// Store credentials for publishing and report where they went.
pub fn login(config_file: Option<PathBuf>, username: &str, password: &str) -> Result<String> {
    let path = config::save_server_credentials(config_file, username, password)?;
    Ok(friendly_path(Some(&path)))
}

fn friendly_path(path: Option<&PathBuf>) -> String {
    if let Some(path) = path {
        if let Some(home) = dirs::home_dir() {
            if let Ok(stripped) = path.strip_prefix(&home) {
                let mut display = String::from("~");
                if !stripped.as_os_str().is_empty() {
                    display.push_str(&format!("/{}", stripped.display()));
                }
                return display;
            }
        }
        path.display().to_string()
    } else {
        "~/.config/cares/config.yaml".to_string()
    }
}
