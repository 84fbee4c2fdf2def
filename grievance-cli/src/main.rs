//! Grievance CLI - terminal client for the grievance portal
//!
//! Each invocation acts on one "tab" (`--tab`), whose session lives in a
//! per-tab file under the configured session directory.

use anyhow::Context;
use clap::{Parser, Subcommand};
use grievance_client::{
    resolve_menu, AuthFlow, ClientError, ClientResult, FileTabStorage, HistoryNavigator,
    HttpAuthApi, LoginRequest, Navigator, RegisterRequest, Role, SessionStore, Shell,
};
use grievance_core::{
    init_logging, log_operation_error, log_operation_start, log_operation_success, ClientConfig,
    GrievanceError, GrievanceResult, LoggingConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "grievance")]
#[command(about = "Terminal client for the university grievance portal")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Tab whose session is used
    #[arg(short, long, global = true, default_value = "default")]
    tab: String,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session for this tab
    Login {
        /// Register number
        #[arg(short, long)]
        register_no: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(long)]
        register_no: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        department: String,

        #[arg(long)]
        password: String,

        /// student, staff or admin
        #[arg(long, default_value = "student")]
        role: String,
    },

    /// Clear this tab's session
    Logout,

    /// Show who is logged in on this tab
    Whoami,

    /// Print the navigation menu
    Menu {
        /// Role to show instead of the logged-in one
        #[arg(short, long)]
        role: Option<String>,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Open a route through the shell
    Open {
        /// Route path, e.g. /portal/my-complaints
        path: String,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logging_config = LoggingConfig::default();
    if cli.verbose {
        logging_config.level = "debug".to_string();
    }
    init_logging(&logging_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    debug!("Starting Grievance CLI v{}", env!("CARGO_PKG_VERSION"));

    if let Commands::Config {
        show,
        init,
        validate,
    } = cli.command
    {
        return handle_config(cli.config.as_ref(), show, init, validate);
    }

    let config = load_config(cli.config.as_ref())?;
    config.validate()?;

    let storage = FileTabStorage::new(&config.storage.session_dir, &cli.tab)
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .context("Failed to open tab storage")?;
    let store = SessionStore::new(Arc::new(storage));
    let navigator = Arc::new(HistoryNavigator::new());

    let result = match cli.command {
        Commands::Login {
            register_no,
            password,
        } => handle_login(&config, store, navigator, register_no, password).await,
        Commands::Register {
            register_no,
            name,
            email,
            phone,
            department,
            password,
            role,
        } => {
            let request = RegisterRequest {
                register_no,
                name,
                email,
                phone,
                department,
                password,
                role,
            };
            handle_register(&config, store, navigator, request).await
        }
        Commands::Logout => handle_logout(&config, store, navigator),
        Commands::Whoami => handle_whoami(&store),
        Commands::Menu { role, json } => handle_menu(&store, role, json),
        Commands::Open { path } => handle_open(&config, store, navigator, &path),
        Commands::Config { .. } => Ok(()),
    };

    result.map_err(|e| {
        debug!(error = ?e, "Command failed");
        anyhow::anyhow!(e.user_message())
    })
}

/// Load configuration and apply environment overrides
fn load_config(config_path: Option<&PathBuf>) -> GrievanceResult<ClientConfig> {
    read_config(config_path)?.apply_env()
}

/// Read the configuration file, searching the default locations when no path is given
fn read_config(config_path: Option<&PathBuf>) -> GrievanceResult<ClientConfig> {
    let config = if let Some(path) = config_path {
        info!("Loading configuration from {:?}", path);
        ClientConfig::from_file(path)?
    } else {
        let default_paths = [
            dirs::config_dir().map(|d| d.join("grievance").join("config.toml")),
            dirs::home_dir().map(|d| d.join(".grievance").join("config.toml")),
            Some(PathBuf::from("grievance.toml")),
        ];

        match default_paths.into_iter().flatten().find(|p| p.exists()) {
            Some(path) => {
                info!("Loading configuration from {:?}", path);
                ClientConfig::from_file(&path)?
            }
            None => {
                debug!("No configuration file found, using defaults");
                ClientConfig::default()
            }
        }
    };

    Ok(config)
}

fn auth_flow(
    config: &ClientConfig,
    store: SessionStore,
    navigator: Arc<HistoryNavigator>,
) -> ClientResult<AuthFlow> {
    let api = HttpAuthApi::new(&config.api)?;
    Ok(AuthFlow::new(Arc::new(api), store, navigator, &config.shell))
}

async fn handle_login(
    config: &ClientConfig,
    store: SessionStore,
    navigator: Arc<HistoryNavigator>,
    register_no: String,
    password: String,
) -> ClientResult<()> {
    let mut flow = auth_flow(config, store, navigator.clone())?;
    let session = flow
        .login(LoginRequest::new(register_no, password))
        .await?;

    println!("✅ Logged in as {}", session.display_string());
    if let Some(route) = navigator.current() {
        println!("📍 {}", route);
    }
    Ok(())
}

async fn handle_register(
    config: &ClientConfig,
    store: SessionStore,
    navigator: Arc<HistoryNavigator>,
    request: RegisterRequest,
) -> ClientResult<()> {
    let register_no = request.register_no.clone();
    let mut flow = auth_flow(config, store, navigator)?;
    flow.show_register();
    flow.register(request).await?;

    println!("✅ Registered {}. You can now log in.", register_no);
    Ok(())
}

fn handle_logout(
    config: &ClientConfig,
    store: SessionStore,
    navigator: Arc<HistoryNavigator>,
) -> ClientResult<()> {
    if !store.is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }

    let current = navigator
        .current()
        .unwrap_or_else(|| config.shell.dashboard_route.clone());
    let shell = Shell::mount(store, navigator.clone(), &config.shell, &current);
    shell.logout()?;

    println!("👋 Logged out");
    Ok(())
}

fn handle_whoami(store: &SessionStore) -> ClientResult<()> {
    match store.get() {
        Some(session) => {
            println!("{}", session.display_string());
            if !session.phone.is_empty() {
                println!("📞 {}", session.phone);
            }
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

fn handle_menu(store: &SessionStore, role: Option<String>, json: bool) -> ClientResult<()> {
    let role = match role {
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|message| ClientError::validation("role", message))?,
        None => store.get_role(),
    };
    let menu = resolve_menu(role);

    if json {
        let rendered = serde_json::to_string_pretty(menu).map_err(GrievanceError::from)?;
        println!("{}", rendered);
        return Ok(());
    }

    for section in menu {
        println!("{}", section.group);
        for item in section.items {
            println!("  {:<22} {}", item.name, item.path);
        }
    }
    Ok(())
}

fn handle_open(
    config: &ClientConfig,
    store: SessionStore,
    navigator: Arc<HistoryNavigator>,
    path: &str,
) -> ClientResult<()> {
    log_operation_start!("open", path = path);

    let mut shell = Shell::mount(
        store,
        navigator.clone(),
        &config.shell,
        &config.shell.dashboard_route,
    );

    if let Err(e) = shell.navigate(path) {
        log_operation_error!("open", e, path = path);
        if let Some(route) = navigator.current() {
            println!("📍 Redirected to {}", route);
        }
        return Err(e);
    }

    let context = shell.screen_context();
    print!("{}", shell.render_menu());
    println!();
    match shell.active_item() {
        Some(item) => println!("📍 {} ({})", item.name, shell.current_path()),
        None => println!("📍 {}", shell.current_path()),
    }
    if let Some(register_no) = &context.register_no {
        println!("👤 {} ({})", register_no, context.role);
    }

    log_operation_success!("open", path = path, role = %context.role);
    Ok(())
}

fn handle_config(
    config_path: Option<&PathBuf>,
    show: bool,
    init: bool,
    validate: bool,
) -> anyhow::Result<()> {
    if init {
        let path = match config_path {
            Some(path) => path.clone(),
            None => dirs::config_dir()
                .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
                .context("Could not determine a configuration directory")?
                .join("grievance")
                .join("config.toml"),
        };

        ClientConfig::default().save_to_file(&path)?;
        println!("✅ Configuration initialized at: {:?}", path);
    }

    if show {
        let config = load_config(config_path)?;
        println!("📋 Current configuration:");
        println!("{}", toml::to_string_pretty(&config)?);
    }

    if validate {
        let config = load_config(config_path)?;
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => {
                e.log();
                println!("❌ Configuration validation failed: {}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}
