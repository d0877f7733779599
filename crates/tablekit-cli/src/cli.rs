//! tablekit - query remote data tables from the terminal
//!
//! ```bash
//! # First page of a table, newest first
//! tablekit fetch assets --sort created_at:desc
//!
//! # Search, facet and advanced conditions
//! tablekit fetch assets --search lamp --filter department=IT,HR --where "price between 10,50"
//!
//! # Saved presets
//! tablekit presets save assets --name "IT lamps" --filter department=IT
//! tablekit presets list assets
//! ```

mod args;
mod logging;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use tablekit_core::{
    ColumnDef, FilterSet, IdentityProvider, RowSelection, StaticIdentity, UserIdentity,
    ViewStateController,
};
use tablekit_filters::{
    date_filter, effective_options, resolve_faceted_filters, FilterPresetStore,
    SqlitePresetRepository,
};
use tablekit_services::{
    HttpListingTransport, ListingTransport, QueryExecutor, SuggestionSource, TableBinding,
};
use tablekit_settings::{TableSettings, TablekitSettings};

use crate::logging::LoggingConfig;

#[derive(Parser, Debug)]
#[command(name = "tablekit", version, about = "Query paginated remote data tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Listing endpoint, overrides the settings file
    #[arg(long, global = true, env = "TABLEKIT_API_URL")]
    api_url: Option<String>,

    /// User id sent with listing requests
    #[arg(long, global = true, env = "TABLEKIT_USER_ID")]
    user_id: Option<String>,

    /// User role sent with listing requests
    #[arg(long, global = true, env = "TABLEKIT_USER_ROLE", default_value = "user")]
    user_role: String,

    /// Also write JSON logs to the tablekit logs directory
    #[arg(long, global = true)]
    log_json: bool,
}

/// Filter flags shared by `fetch` and `presets save`
#[derive(clap::Args, Debug, Default)]
struct FilterArgs {
    /// Column filter as column=value; comma separated values select several options
    #[arg(long = "filter", value_name = "COLUMN=VALUE")]
    filters: Vec<String>,

    /// Advanced condition as "column operator value", e.g. "price between 10,50"
    #[arg(long = "where", value_name = "CONDITION")]
    conditions: Vec<String>,

    /// Single-day filter on the table's configured date column
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch and print one page of a table
    Fetch {
        table: String,

        /// Page number, starting at 1
        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        page_size: Option<u32>,

        /// Global search query
        #[arg(long)]
        search: Option<String>,

        /// Sort as column[:asc|desc]; repeat for multi-column sort
        #[arg(long = "sort", value_name = "COLUMN[:DIR]")]
        sort: Vec<String>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Apply a saved or built-in preset before other filters
        #[arg(long)]
        preset: Option<String>,

        /// Hide a column
        #[arg(long = "hide", value_name = "COLUMN")]
        hidden: Vec<String>,

        /// Select a row by id; repeat to select several
        #[arg(long = "select", value_name = "ROW_ID")]
        select: Vec<String>,

        /// Select every row on the page
        #[arg(long)]
        select_all: bool,

        /// Print option counts of the table's faceted filters
        #[arg(long)]
        facets: bool,

        /// Print the rendered view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print search suggestions for a table
    Suggest {
        table: String,

        /// Only suggestions containing this text
        #[arg(long)]
        query: Option<String>,
    },

    /// Manage filter presets
    Presets {
        #[command(subcommand)]
        command: PresetCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PresetCommands {
    /// List built-in and saved presets
    List { table: String },

    /// Save the given filters as a preset
    Save {
        table: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        description: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Delete a saved preset
    Delete { table: String, id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logging_config = LoggingConfig::default();
    if cli.log_json {
        logging_config = logging_config.with_json_logs();
    }
    if let Err(e) = logging::init(logging_config) {
        eprintln!("Failed to initialize logging: {e:#}");
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let settings = match &cli.settings {
        Some(path) => TablekitSettings::load_from(path)?,
        None => TablekitSettings::load()?,
    };

    match &cli.command {
        Commands::Fetch {
            table,
            page,
            page_size,
            search,
            sort,
            filters,
            preset,
            hidden,
            select,
            select_all,
            facets,
            json,
        } => {
            let request = FetchRequest {
                table,
                page: *page,
                page_size: *page_size,
                search: search.as_deref(),
                sort,
                filters,
                preset: preset.as_deref(),
                hidden,
                select,
                select_all: *select_all,
                facets: *facets,
                json: *json,
            };
            cmd_fetch(&cli, &settings, request).await
        }
        Commands::Suggest { table, query } => {
            cmd_suggest(&cli, &settings, table, query.as_deref()).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Presets { command } => {
            cmd_presets(&settings, command)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

struct FetchRequest<'a> {
    table: &'a str,
    page: Option<u32>,
    page_size: Option<u32>,
    search: Option<&'a str>,
    sort: &'a [String],
    filters: &'a FilterArgs,
    preset: Option<&'a str>,
    hidden: &'a [String],
    select: &'a [String],
    select_all: bool,
    facets: bool,
    json: bool,
}

fn transport(cli: &Cli, settings: &TablekitSettings) -> Result<Arc<dyn ListingTransport>> {
    let url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| settings.endpoint.listing_url.clone());
    if url.trim().is_empty() {
        bail!("No listing endpoint configured; pass --api-url or set endpoint.listing_url");
    }
    let transport = HttpListingTransport::new(url, settings.endpoint.request_timeout())?;
    Ok(Arc::new(transport))
}

fn identity(cli: &Cli) -> Arc<dyn IdentityProvider> {
    match &cli.user_id {
        Some(id) => Arc::new(StaticIdentity::new(UserIdentity::new(id, &cli.user_role))),
        None => Arc::new(StaticIdentity::anonymous()),
    }
}

fn open_presets(settings: &TablekitSettings, table: &str) -> Result<FilterPresetStore> {
    let path = tablekit_settings::presets_file()?;
    let repository = SqlitePresetRepository::open(path)
        .context("Failed to open the preset database")?;
    let builtins = settings.table(table).builtin_presets(Utc::now());
    Ok(FilterPresetStore::open(table, builtins, Arc::new(repository)))
}

/// Collect `--filter`, `--where` and `--date` into one filter set
fn collect_filters(table: &TableSettings, flags: &FilterArgs) -> Result<FilterSet> {
    let mut filters = FilterSet::new();

    for filter in &flags.filters {
        let (column, value) = args::parse_filter(filter)?;
        filters.insert(column, value);
    }

    if !flags.conditions.is_empty() {
        filters.extend(args::parse_conditions(&flags.conditions)?);
    }

    if let Some(date) = &flags.date {
        let column = table
            .date_filter_column
            .as_deref()
            .context("This table has no date filter column configured")?;
        if let Some(value) = date_filter(Some(args::parse_date(date)?)) {
            filters.insert(column.to_string(), value);
        }
    }

    Ok(filters)
}

async fn cmd_fetch(
    cli: &Cli,
    settings: &TablekitSettings,
    request: FetchRequest<'_>,
) -> Result<ExitCode> {
    let table_settings = settings.table(request.table);

    let mut controller = ViewStateController::with_initial_filters(
        settings.initial_view(request.table),
        table_settings.initial_filters.clone(),
    );

    if let Some(preset_id) = request.preset {
        let store = open_presets(settings, request.table)?;
        controller.apply_filter_set(store.apply(preset_id)?);
    }

    for (column, value) in collect_filters(&table_settings, request.filters)? {
        controller.set_column_filter(column, Some(value));
    }
    if let Some(search) = request.search {
        controller.set_search(search);
    }
    if !request.sort.is_empty() {
        let criteria = request
            .sort
            .iter()
            .map(|s| args::parse_sort(s))
            .collect::<Result<Vec<_>>>()?;
        controller.set_sort(criteria);
    }
    if let Some(page_size) = request.page_size {
        controller.set_page_size(page_size)?;
    }
    for column in request.hidden {
        controller.set_column_visibility(column, false);
    }
    // Last, since every other change returns to the first page
    if let Some(page) = request.page {
        controller.set_page(page);
    }

    let executor = QueryExecutor::new(
        table_settings.query_config(request.table),
        transport(cli, settings)?,
        identity(cli),
    )
    .with_policy(settings.access_policy())
    .with_cache(settings.query_cache());

    let selection = Arc::new(Mutex::new(RowSelection::default()));
    let page_selection = selection.clone();
    executor.on_data_change(move |rows| page_selection.lock().replace_rows(rows));

    let outcome = executor.execute(controller.state()).await;
    let state = executor.state();

    let mut selection = selection.lock().clone();
    if request.select_all {
        selection.toggle_all();
    }
    for id in request.select {
        if !selection.is_selected(id) && !selection.toggle_item(id) {
            tracing::warn!(table = request.table, id = %id, "row to select is not on this page");
        }
    }

    let columns = if table_settings.columns.is_empty() {
        infer_columns(state.result.as_deref().map(|r| r.rows.as_slice()).unwrap_or(&[]))
    } else {
        table_settings.columns.clone()
    };

    let binding = TableBinding::new(columns.clone())
        .with_page_size_options(settings.pagination.page_size_options.clone());
    let view = binding.render(controller.state(), &state);

    if request.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render::render_view(&view));
        if selection.selected_count() > 0 {
            print!("{}", render::render_selection(&selection));
        }
    }

    if request.facets {
        let rows = state.result.as_deref().map(|r| r.rows.as_slice()).unwrap_or(&[]);
        for facet in resolve_faceted_filters(&table_settings.faceted_filters, &columns) {
            println!("{}", render::render_facet(&facet.title, &effective_options(facet, rows)));
        }
    }

    match outcome {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            tracing::warn!(table = request.table, error = %err, "fetch failed");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Columns in the order of the first row's keys
fn infer_columns(rows: &[tablekit_core::Row]) -> Vec<ColumnDef> {
    rows.first()
        .map(|row| row.keys().map(|key| ColumnDef::new(key, key)).collect())
        .unwrap_or_default()
}

async fn cmd_suggest(
    cli: &Cli,
    settings: &TablekitSettings,
    table: &str,
    query: Option<&str>,
) -> Result<()> {
    let config = settings.table(table).query_config(table);
    let source = SuggestionSource::new(config, transport(cli, settings)?);
    if !source.is_enabled() {
        bail!("Table '{table}' has no search columns configured");
    }

    let suggestions = match query {
        Some(query) => source.matching(query).await?,
        None => (*source.load().await?).clone(),
    };
    for suggestion in suggestions {
        println!("{suggestion}");
    }
    Ok(())
}

fn cmd_presets(settings: &TablekitSettings, command: &PresetCommands) -> Result<()> {
    match command {
        PresetCommands::List { table } => {
            let store = open_presets(settings, table)?;
            println!("{}", render::render_presets(&store.list()));
        }
        PresetCommands::Save {
            table,
            name,
            description,
            filters,
        } => {
            let filters = collect_filters(&settings.table(table), filters)?;
            if filters.is_empty() {
                bail!("A preset needs at least one --filter, --where or --date");
            }
            let mut store = open_presets(settings, table)?;
            let preset = store.save(name, description.as_deref(), filters)?;
            println!("Saved preset '{}' ({})", preset.name, preset.id);
        }
        PresetCommands::Delete { table, id } => {
            let mut store = open_presets(settings, table)?;
            store.delete(id)?;
            println!("Deleted preset {id}");
        }
    }
    Ok(())
}
