use clap::Parser;
use miette::{IntoDiagnostic, Result};
use pagamento_console::application::controller::PaymentListController;
use pagamento_console::application::notifications::NotificationBus;
use pagamento_console::config::ListConfig;
use pagamento_console::domain::filter::StatusFilter;
use pagamento_console::domain::pagination::PageSize;
use pagamento_console::domain::payment::{PaymentRecord, PaymentStatus};
use pagamento_console::domain::ports::PaymentGatewayRef;
use pagamento_console::infrastructure::in_memory::InMemoryPaymentGateway;
use pagamento_console::infrastructure::timeout::TimeoutGateway;
use pagamento_console::interfaces::csv::payment_reader::PaymentReader;
use pagamento_console::interfaces::csv::payment_writer::PaymentWriter;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV file with the payments to load into the in-memory service
    seed: PathBuf,

    /// Search text: a CPF/CNPJ (with or without punctuation) or a payment id
    #[arg(long)]
    search: Option<String>,

    /// Status filter: "all" or a payment status
    #[arg(long)]
    status: Option<StatusFilter>,

    /// Page size (10, 20 or 50)
    #[arg(long)]
    page_size: Option<PageSize>,

    /// Page to print, starting at 1
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Deactivate the payment with this id before listing (repeatable)
    #[arg(long)]
    inactivate: Vec<String>,

    /// Change a payment's status before listing, as PAYMENT_ID=STATUS (repeatable)
    #[arg(long, value_parser = parse_status_change)]
    process: Vec<(u64, PaymentStatus)>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_status_change(arg: &str) -> std::result::Result<(u64, PaymentStatus), String> {
    let (id, status) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected PAYMENT_ID=STATUS, got '{arg}'"))?;
    let id = id
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid payment id '{id}': {e}"))?;
    let status = status.parse::<PaymentStatus>().map_err(|e| e.to_string())?;
    Ok((id, status))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ListConfig::from_json_file(path).into_diagnostic()?,
        None => ListConfig::default(),
    };

    // Seed the in-memory service
    let file = File::open(&cli.seed).into_diagnostic()?;
    let mut seed: Vec<PaymentRecord> = Vec::new();
    for record in PaymentReader::new(file).payments() {
        let checked = record.map(PaymentRecord::from).and_then(|payment| {
            payment.validate()?;
            Ok(payment)
        });
        match checked {
            Ok(payment) => seed.push(payment),
            Err(e) => eprintln!("Error reading payment: {}", e),
        }
    }

    let gateway: PaymentGatewayRef = Arc::new(TimeoutGateway::new(
        InMemoryPaymentGateway::with_records(seed),
        config.request_timeout(),
    ));
    let bus = NotificationBus::new(config.notification_capacity)
        .with_display_for(config.notification_display());
    let mut notifications = bus.subscribe();

    let controller = PaymentListController::from_config(gateway, bus, &config).into_diagnostic()?;
    controller.mount().await;

    for id in &cli.inactivate {
        controller.inactivate(Some(id.as_str())).await;
    }
    for (payment_id, status) in &cli.process {
        controller.process_status(*payment_id, *status).await;
    }

    let filtered = cli.search.is_some() || cli.status.is_some() || cli.page_size.is_some();
    if let Some(search) = cli.search {
        controller.set_search(search).await;
    }
    if let Some(status) = cli.status {
        controller.set_status_filter(status).await;
    }
    if let Some(page_size) = cli.page_size {
        controller.set_page_size(page_size).await;
    }
    if filtered {
        controller.reload_now().await;
    }

    controller.go_to_page(cli.page).await;
    let view = controller.view().await;
    controller.shutdown().await;

    for event in notifications.drain() {
        eprintln!("[{}] {}", event.severity, event.message);
    }
    eprintln!(
        "page {} of {} ({} payments)",
        view.current_page, view.total_pages, view.total_items
    );

    let stdout = io::stdout();
    let mut writer = PaymentWriter::new(stdout.lock());
    writer.write_payments(&view.payments).into_diagnostic()?;

    Ok(())
}
