use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;
mod config;

mod domain {
    pub mod column;
    pub mod date_range;
    pub mod entities {
        pub mod document;
        pub mod table_state;
    }
}

mod usecase {
    pub mod grid;
    pub mod ports {
        pub mod api;
        pub mod prefs;
    }
    pub mod services {
        pub mod assignment_service;
        pub mod prefs_service;
        pub mod query_service;
        pub mod review_service;
        pub mod table_state_store;
    }
}

mod infra {
    pub mod export {
        pub mod csv;
    }
    pub mod http {
        pub mod client;
    }
    pub mod sqlite {
        pub mod queries;
        pub mod repo;
        pub mod schema;
    }
}

mod platform {
    pub mod desktop {
        pub mod blocking;
    }
}

mod ui {
    pub mod state {
        pub mod app_state;
    }
}

use crate::app::App;
use crate::config::{default_webview_data_dir, AppConfig};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn main() {
    init_logging();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %format!("{err:#}"), "invalid configuration");
            std::process::exit(2);
        }
    };
    let webview_data_dir = match default_webview_data_dir() {
        Ok(dir) => dir,
        Err(err) => {
            error!(error = %format!("{err:#}"), "failed to prepare webview data directory");
            std::process::exit(1);
        }
    };
    info!(
        api = %config.api_base_url,
        db = %config.db_path.display(),
        page_size = config.default_page_size,
        "starting chart audit desk"
    );

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("Chart Audit Desk"))
                .with_data_directory(webview_data_dir),
        )
        .with_context(config)
        .launch(App);
}

#[cfg(test)]
mod tests;
