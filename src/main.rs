//! Cubalink23 operations toolkit entry point.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cubalink_ops::api::{create_router, metrics_router, AppState};
use cubalink_ops::backend::{BackendClient, UserRecord};
use cubalink_ops::config::Config;
use cubalink_ops::keepalive::KeepAlive;
use cubalink_ops::metrics;
use cubalink_ops::provision::{apply_plan, role_plan, schema_plan, storage_plan, OpOutcome, ProvisionPlan, ProvisionSummary};
use cubalink_ops::utils::shutdown_signal;

/// Cubalink23 operations toolkit.
#[derive(Parser, Debug)]
#[command(name = "cubalink-ops")]
#[command(about = "Backend provisioning, proxy router and keep-alive for the Cubalink23 platform")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (serve mode).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web router (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Check backend connectivity (REST, storage, upload round-trip).
    CheckBackend,

    /// Apply built-in provisioning plans.
    Provision {
        /// Which plan to apply.
        #[arg(value_enum, default_value = "all")]
        target: ProvisionTarget,
    },

    /// Assign a role to a user by email.
    AssignRole {
        /// User email address.
        #[arg(long)]
        email: String,

        /// Role to assign (e.g. admin, vendor, user).
        #[arg(long)]
        role: String,
    },

    /// Run one keep-alive cycle against a deployed instance and report.
    Probe {
        /// Instance base URL.
        #[arg(long)]
        base_url: String,

        /// Per-probe timeout in seconds.
        #[arg(long, default_value = "10")]
        timeout: u64,

        /// Success ratio below which the probe fails.
        #[arg(long, default_value = "0.5")]
        threshold: f64,

        /// Milliseconds to pause between probes.
        #[arg(long, default_value = "500")]
        pause: u64,

        /// Endpoint path to probe (repeatable; defaults to the built-in list).
        #[arg(long = "endpoint")]
        endpoints: Vec<String>,
    },

    /// Keep a deployed instance awake by probing it on an interval.
    KeepAlive {
        /// Instance base URL.
        #[arg(long)]
        base_url: String,

        /// Seconds between cycles.
        #[arg(long, default_value = "840")]
        interval: u64,

        /// Per-probe timeout in seconds.
        #[arg(long, default_value = "10")]
        timeout: u64,

        /// Success ratio below which a cycle logs a warning.
        #[arg(long, default_value = "0.5")]
        threshold: f64,

        /// Milliseconds to pause between probes within a cycle.
        #[arg(long, default_value = "2000")]
        pause: u64,

        /// Endpoint path to probe (repeatable; defaults to the built-in list).
        #[arg(long = "endpoint")]
        endpoints: Vec<String>,
    },
}

/// Which built-in provisioning plan to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProvisionTarget {
    /// Schema columns and policies.
    Schema,
    /// Storage buckets.
    Storage,
    /// Everything, schema first.
    All,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("cubalink_ops=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::CheckBackend) => cmd_check_backend().await,
        Some(Command::Provision { target }) => cmd_provision(target).await,
        Some(Command::AssignRole { email, role }) => cmd_assign_role(&email, &role).await,
        Some(Command::Probe {
            base_url,
            timeout,
            threshold,
            pause,
            endpoints,
        }) => cmd_probe(&base_url, timeout, threshold, pause, endpoints).await,
        Some(Command::KeepAlive {
            base_url,
            interval,
            timeout,
            threshold,
            pause,
            endpoints,
        }) => cmd_keepalive(&base_url, interval, timeout, threshold, pause, endpoints).await,
        Some(Command::Serve { port }) => cmd_serve(port).await,
        None => cmd_serve(args.port).await,
    }
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("CUBALINK23 OPS - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    // Show configuration summary
    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Backend URL: {}", config.backend_url);
    println!("  Service Key: present");
    println!(
        "  Anon Key: {}",
        if config.backend_anon_key.is_some() { "present" } else { "not set" }
    );
    println!(
        "  Flight API: {} ({})",
        if config.has_flight_api() { "configured" } else { "NOT CONFIGURED" },
        config.flight_api_url
    );
    println!("  Flight API Version: {}", config.flight_api_version);
    println!(
        "  Payment API: {} ({})",
        if config.has_payment_api() { "configured" } else { "NOT CONFIGURED" },
        config.payment_api_url
    );
    println!(
        "  Payment Location: {}",
        if config.payment_location_id.is_empty() {
            "not set"
        } else {
            config.payment_location_id.as_str()
        }
    );
    println!("  Currency: {}", config.currency);
    println!("  Server Port: {}", config.port);
    println!("  Keep-Alive Interval: {}s", config.keepalive_interval_s);
    println!(
        "  Keep-Alive Threshold: {}",
        config.keepalive_success_threshold
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Check backend connectivity.
async fn cmd_check_backend() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("CUBALINK23 OPS - BACKEND CHECK");
    println!("======================================================================");

    // Load configuration
    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    println!("Backend: {}", config.backend_url);
    println!("Service Key: present");
    println!("======================================================================");

    // Create client
    print!("\n1. Creating client... ");
    let client = BackendClient::new(&config);
    println!("OK");

    // REST ping
    print!("\n2. Querying users table... ");
    match client
        .rest_get("users", &[("select", "id"), ("limit", "1")])
        .await
    {
        Ok(value) => {
            println!("OK");
            let rows = value.as_array().map(|a| a.len()).unwrap_or(0);
            println!("   Rows returned: {}", rows);
        }
        Err(e) => {
            println!("FAILED");
            println!("   Error: {}", e);
        }
    }

    // Bucket metadata
    print!("\n3. Checking 'banners' bucket... ");
    match client.get_bucket("banners").await {
        Ok(bucket) => {
            println!("OK");
            println!(
                "   Public: {}",
                bucket.public.map(|p| p.to_string()).unwrap_or_else(|| "unknown".to_string())
            );
        }
        Err(e) => {
            println!("FAILED");
            println!("   Error: {}", e);
        }
    }

    // Storage listing
    print!("\n4. Listing 'banners' bucket... ");
    match client.list_objects("banners").await {
        Ok(objects) => {
            println!("OK");
            println!("   Objects: {}", objects.len());
            for object in objects.iter().take(5) {
                println!("   - {}", object.name);
            }
            if objects.len() > 5 {
                println!("   ... and {} more", objects.len() - 5);
            }
        }
        Err(e) => {
            println!("FAILED");
            println!("   Error: {}", e);
        }
    }

    // Upload round-trip
    print!("\n5. Uploading healthcheck object... ");
    let body = format!(
        "cubalink-ops healthcheck {}",
        time::OffsetDateTime::now_utc()
    );
    match client
        .upload_object("banners", "ops-healthcheck.txt", body.into_bytes(), "text/plain")
        .await
    {
        Ok(()) => {
            println!("OK");
            println!(
                "   Public URL: {}",
                client.public_url("banners", "ops-healthcheck.txt")
            );
        }
        Err(e) => {
            println!("FAILED");
            println!("   Error: {}", e);
        }
    }

    println!("\n======================================================================");
    println!("BACKEND CHECK COMPLETED");
    println!("======================================================================");

    Ok(())
}

/// Print a completed plan's per-op lines and totals.
fn print_summary(summary: &ProvisionSummary) {
    for result in &summary.results {
        match &result.outcome {
            OpOutcome::Applied => println!("  APPLIED  {}", result.label),
            OpOutcome::AlreadyPresent => println!("  EXISTS   {}", result.label),
            OpOutcome::Failed { detail } => println!("  FAILED   {} ({})", result.label, detail),
        }
    }
    println!("----------------------------------------------------------------------");
    println!(
        "  {} applied, {} already present, {} failed",
        summary.applied, summary.already_present, summary.failed
    );
}

/// Apply built-in provisioning plans.
async fn cmd_provision(target: ProvisionTarget) -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let client = BackendClient::new(&config);

    let plans: Vec<ProvisionPlan> = match target {
        ProvisionTarget::Schema => vec![schema_plan()],
        ProvisionTarget::Storage => vec![storage_plan()],
        ProvisionTarget::All => vec![schema_plan(), storage_plan()],
    };

    let mut total_failed = 0;

    for plan in &plans {
        println!("======================================================================");
        println!("PROVISION - {}", plan.name.to_uppercase());
        println!("======================================================================");

        let summary = apply_plan(&client, plan).await;
        print_summary(&summary);
        total_failed += summary.failed;
    }

    println!("======================================================================");
    if total_failed == 0 {
        println!("PROVISIONING COMPLETED");
        println!("======================================================================");
        Ok(())
    } else {
        println!("PROVISIONING COMPLETED WITH {} FAILURES", total_failed);
        println!("======================================================================");
        Err(anyhow::anyhow!("{} provisioning ops failed", total_failed))
    }
}

/// Assign a role to a user by email.
async fn cmd_assign_role(email: &str, role: &str) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("CUBALINK23 OPS - ROLE ASSIGNMENT");
    println!("======================================================================");
    println!("Email: {}", email);
    println!("Role: {}", role);
    println!("======================================================================");

    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let client = BackendClient::new(&config);

    // Look up the user first so a typo'd email fails loudly instead of
    // patching zero rows.
    print!("\n1. Looking up user... ");
    let filter = format!("eq.{}", email);
    let rows = match client
        .rest_get("users", &[("email", &filter), ("select", "id,email,role")])
        .await
    {
        Ok(value) => {
            println!("OK");
            value
        }
        Err(e) => {
            println!("FAILED");
            println!("   Error: {}", e);
            return Err(anyhow::anyhow!("User lookup failed"));
        }
    };

    let users: Vec<UserRecord> = serde_json::from_value(rows)?;
    let current_role = match users.first() {
        Some(user) => user.role.as_deref().unwrap_or("(none)").to_string(),
        None => {
            println!("   No user found with email {}", email);
            return Err(anyhow::anyhow!("User not found"));
        }
    };
    println!("   Current role: {}", current_role);

    // Apply the role plan
    print!("\n2. Assigning role... ");
    let plan = role_plan(email, role);
    let summary = apply_plan(&client, &plan).await;
    if summary.ok() {
        println!("OK");
    } else {
        println!("FAILED");
        print_summary(&summary);
        return Err(anyhow::anyhow!("Role assignment failed"));
    }

    // Verify
    print!("\n3. Verifying... ");
    match client
        .rest_get("users", &[("email", &filter), ("select", "role")])
        .await
    {
        Ok(value) => {
            let users: Vec<UserRecord> = serde_json::from_value(value).unwrap_or_default();
            let new_role = users
                .first()
                .and_then(|user| user.role.as_deref())
                .unwrap_or("(unknown)");
            println!("OK");
            println!("   Role is now: {}", new_role);
        }
        Err(e) => {
            println!("FAILED");
            println!("   Error: {}", e);
        }
    }

    println!("\n======================================================================");
    println!("ROLE ASSIGNMENT COMPLETED");
    println!("======================================================================");

    Ok(())
}

/// Run one keep-alive cycle and report.
async fn cmd_probe(
    base_url: &str,
    timeout: u64,
    threshold: f64,
    pause: u64,
    endpoints: Vec<String>,
) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("CUBALINK23 OPS - ENDPOINT PROBE");
    println!("======================================================================");
    println!("Target: {}", base_url);
    println!("======================================================================\n");

    let mut keepalive = KeepAlive::with_settings(
        base_url,
        Duration::from_secs(timeout),
        Duration::from_millis(pause),
        threshold,
    );
    if !endpoints.is_empty() {
        keepalive = keepalive.with_endpoints(endpoints);
    }

    let report = keepalive.run_cycle().await;

    for probe in &report.probes {
        match (probe.status, &probe.error) {
            (Some(status), _) => {
                println!(
                    "  {}  {} ({} ms)",
                    if probe.ok { "OK    " } else { "FAILED" },
                    probe.path,
                    probe.elapsed_ms
                );
                if !probe.ok {
                    println!("          HTTP {}", status);
                }
            }
            (None, Some(error)) => {
                println!("  FAILED  {} ({} ms)", probe.path, probe.elapsed_ms);
                println!("          {}", error);
            }
            _ => {}
        }
    }

    println!("\n----------------------------------------------------------------------");
    println!(
        "  {}/{} probes succeeded (ratio {:.2})",
        report.succeeded(),
        report.total(),
        report.success_ratio()
    );
    println!("======================================================================");

    if report.below_threshold(threshold) {
        println!("PROBE FAILED (below threshold {:.2})", threshold);
        println!("======================================================================");
        Err(anyhow::anyhow!("Success ratio below threshold"))
    } else {
        println!("PROBE PASSED");
        println!("======================================================================");
        Ok(())
    }
}

/// Run the keep-alive loop until shutdown.
async fn cmd_keepalive(
    base_url: &str,
    interval: u64,
    timeout: u64,
    threshold: f64,
    pause: u64,
    endpoints: Vec<String>,
) -> anyhow::Result<()> {
    let mut keepalive = KeepAlive::with_settings(
        base_url,
        Duration::from_secs(timeout),
        Duration::from_millis(pause),
        threshold,
    );
    if !endpoints.is_empty() {
        keepalive = keepalive.with_endpoints(endpoints);
    }

    keepalive
        .run(Duration::from_secs(interval), shutdown_signal())
        .await;

    Ok(())
}

/// Run the web router.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let config = Config::load()?;

    if let Err(e) = config.validate() {
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    if !config.has_flight_api() {
        warn!("FLIGHT_API_KEY not set; airport searches will return empty results");
    }
    if !config.has_payment_api() {
        warn!("PAYMENT_API_KEY not set; payment endpoints will fail");
    }

    let port = port_override.unwrap_or(config.port);

    // Install the Prometheus recorder before any metric is touched
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {}", e))?;
    metrics::init_metrics();

    // Create app state
    let app_state = AppState::new(&config);
    app_state.set_ready(true);

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(app_state).merge(metrics_router(metrics_handle));

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
