use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use explorebd::adapter::filter_records;
use explorebd::booking::BookingQuote;
use explorebd::{
    Access, Client, ListView, Record, Role, Session, SortCriterion, check_route, resources,
};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "explorebd", version, about = "Browse ExploreBD resource lists from the terminal")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch one page of a resource list
    List {
        /// Resource: packages, users, guides, bookings or stories
        resource: String,

        /// Zero-based page index (clamped to the last page)
        #[arg(long, short = 'p', default_value_t = 0)]
        page: usize,

        /// Page size; must be one the resource offers
        #[arg(long, short = 's')]
        size: Option<usize>,

        /// price-asc, price-desc, duration-asc or duration-desc
        #[arg(long)]
        sort: Option<SortCriterion>,

        /// Server-side filter as name=value (repeatable)
        #[arg(long = "filter", short = 'f', value_parser = parse_filter)]
        filters: Vec<(String, String)>,

        /// Client-side search over the page; `*` is a wildcard
        #[arg(long)]
        search: Option<String>,
    },

    /// Check whether a role may open a dashboard route
    Access {
        /// Route path, e.g. /dashboard/manage-users
        path: String,

        /// Role of the signed-in account; omit for an anonymous visitor
        #[arg(long)]
        role: Option<Role>,
    },

    /// Price a booking
    Quote {
        /// Price per member
        #[arg(long)]
        price: f64,

        /// Party size
        #[arg(long, default_value_t = 1)]
        members: u32,
    },
}

fn parse_filter(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("filter name is empty in '{}'", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    match args.command {
        Command::List {
            resource,
            page,
            size,
            sort,
            filters,
            search,
        } => list(&resource, page, size, sort, filters, search).await,
        Command::Access { path, role } => {
            let session = role.map(|role| Session::new("cli@explorebd.local", role));
            match check_route(&path, session.as_ref()) {
                Access::Allow => println!("allow"),
                Access::RedirectTo(target) => println!("redirect -> {}", target),
            }
            Ok(())
        }
        Command::Quote { price, members } => {
            let quote = BookingQuote::new(price, members).context("invalid booking")?;
            println!("{:.2} x {} = {:.2}", quote.unit_price(), quote.members(), quote.total());
            Ok(())
        }
    }
}

async fn list(
    resource: &str,
    page: usize,
    size: Option<usize>,
    sort: Option<SortCriterion>,
    filters: Vec<(String, String)>,
    search: Option<String>,
) -> Result<()> {
    let preset = resources::lookup(resource).ok_or_else(|| anyhow!("unknown resource '{}'", resource))?;
    let client = Client::from_env().context("failed to configure API client")?;
    let mut controller = client.controller(&preset);

    if let Some(size) = size {
        if !controller.set_page_size(size) {
            bail!("page size {} not offered for {} (choose from {:?})", size, preset.name, preset.page_sizes);
        }
    }
    for (name, value) in &filters {
        if !controller.set_filter(name, value) {
            bail!("{} does not filter by '{}' (choose from {:?})", preset.name, name, preset.filter_fields);
        }
    }
    if !controller.set_sort(sort) {
        bail!("{} cannot be sorted (choose from {:?})", preset.name, preset.sort_options);
    }

    // Out-of-range pages are clamped once the total arrives
    controller.set_page(page);
    controller.load(client.cache()).await;
    debug!(stats = ?client.cache().stats(), "cache after list");

    match controller.view() {
        ListView::Rows {
            items,
            page_index,
            page_buttons,
            total_count,
        } => {
            let items = match search.as_deref() {
                Some(pattern) => filter_records(&items, preset.search_fields, pattern)?,
                None => items,
            };
            print_rows(&items);
            println!(
                "\npage {} of {} ({} record(s) in total)",
                page_index + 1,
                page_buttons.len(),
                total_count
            );
        }
        ListView::Empty => println!("No results"),
        ListView::Failed { message } => {
            let detail = controller
                .last_error()
                .map(ToString::to_string)
                .unwrap_or_default();
            bail!("{} ({})", message, detail);
        }
        ListView::Idle | ListView::Loading { .. } => bail!("list did not finish loading"),
    }

    Ok(())
}

fn print_rows(items: &[Record]) {
    if items.is_empty() {
        println!("No matching rows on this page");
        return;
    }

    let mut columns: Vec<&str> = Vec::new();
    for record in items {
        for key in record.fields().keys() {
            if !columns.contains(&key.as_str()) && columns.len() < 6 {
                columns.push(key.as_str());
            }
        }
    }

    let cell = |record: &Record, column: &str| -> String {
        match record.field(column) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    };

    let widths: Vec<usize> = columns
        .iter()
        .map(|column| {
            items
                .iter()
                .map(|record| cell(record, column).chars().count().min(32))
                .max()
                .unwrap_or(0)
                .max(column.len())
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(column, width)| format!("{:width$}", column, width = *width))
        .collect();
    println!("{}", header.join(" | "));
    println!(
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    );

    for record in items {
        let row: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(column, width)| {
                let text: String = cell(record, column).chars().take(32).collect();
                format!("{:width$}", text, width = *width)
            })
            .collect();
        println!("{}", row.join(" | "));
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("explorebd=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
