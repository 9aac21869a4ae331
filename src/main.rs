//! Vault CLI - asset pack publishing and shared library tool
//!
//! Usage: vault <COMMAND>
//!
//! Commands:
//!   init     Generate the settings and tag-pool documents
//!   publish  Package an asset and its dependencies into the library
//!   update   Edit a published pack's metadata in place
//!   list     Browse the shared library
//!   tags     Show or extend the shared tag pool
//!   check    Classify an asset's dependency hierarchy
//!   import   Copy a pack into a project and extract it
//!   status   Reconcile the library against a project

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;

use vault::hierarchy::{self, HierarchyBadness, HierarchyReport, RegistrySnapshot};
use vault::importer;
use vault::library::{LibraryFilter, LibraryIndex, VersionState};
use vault::models::{Category, PackMetadata, SortType};
use vault::publisher::{self, PublishRequest, UpdateRequest};
use vault::settings::VaultSettings;

/// Vault - asset pack publishing and shared library tool
#[derive(Parser, Debug)]
#[command(name = "vault")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format for CI
    #[arg(long, global = true)]
    json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the settings and tag-pool documents with defaults
    Init,

    /// Package an asset and its dependency closure into the library
    Publish {
        /// Root asset identifier, e.g. /Game/Vault/OakTrees/Oak_A
        asset: String,

        /// Visible pack name
        #[arg(short, long)]
        name: String,

        /// Author name (defaults to DeveloperName from the local settings)
        #[arg(long)]
        author: Option<String>,

        /// Pack description
        #[arg(short, long)]
        description: String,

        /// Tags, comma separated (at least one required)
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Pack category
        #[arg(short, long, default_value = "Unknown")]
        category: Category,

        /// Registry snapshot exported from the engine project
        #[arg(short, long, default_value = "VaultRegistry.json")]
        registry: PathBuf,

        /// PNG to attach as the pack thumbnail
        #[arg(long)]
        thumbnail: Option<PathBuf>,

        /// Skip interactive prompts (accept duplicate/hierarchy warnings)
        #[arg(short, long)]
        yes: bool,
    },

    /// Edit a published pack's metadata without repackaging
    Update {
        /// Pack name to edit
        name: String,

        /// Replace the author
        #[arg(long)]
        author: Option<String>,

        /// Replace the description
        #[arg(short, long)]
        description: Option<String>,

        /// Replace the tag set, comma separated
        #[arg(short, long, value_delimiter = ',')]
        tags: Option<Vec<String>>,

        /// Replace the category
        #[arg(short, long)]
        category: Option<Category>,
    },

    /// Browse the shared library
    List {
        /// Keep packs carrying any of these tags
        #[arg(short, long)]
        tag: Vec<String>,

        /// Keep packs by any of these authors
        #[arg(short, long)]
        author: Vec<String>,

        /// Free-text search over name, description and tags
        #[arg(short, long)]
        search: Option<String>,

        /// Require every search term to match instead of any
        #[arg(long)]
        strict: bool,

        /// Sort order: name, created or modified
        #[arg(long, default_value = "name")]
        sort: SortType,

        /// Reverse the sort order
        #[arg(long)]
        reverse: bool,
    },

    /// Show the shared tag pool, optionally merging new tags in
    Tags {
        /// Tags to union into the pool, comma separated
        #[arg(long, value_delimiter = ',')]
        add: Vec<String>,
    },

    /// Classify an asset's dependency hierarchy without publishing
    Check {
        /// Root asset identifier
        asset: String,

        /// Registry snapshot exported from the engine project
        #[arg(short, long, default_value = "VaultRegistry.json")]
        registry: PathBuf,
    },

    /// Copy a pack from the library into a project and extract it
    Import {
        /// Pack name or file id
        pack: String,

        /// Project root directory
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },

    /// Reconcile every library pack against a project's imported copies
    Status {
        /// Project root directory
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => cmd_init(cli.json),
        Commands::Publish {
            asset,
            name,
            author,
            description,
            tags,
            category,
            registry,
            thumbnail,
            yes,
        } => cmd_publish(
            &asset,
            &name,
            author,
            &description,
            tags,
            category,
            &registry,
            thumbnail,
            yes,
            cli.json,
            cli.verbose,
        ),
        Commands::Update {
            name,
            author,
            description,
            tags,
            category,
        } => cmd_update(&name, author, description, tags, category, cli.json),
        Commands::List {
            tag,
            author,
            search,
            strict,
            sort,
            reverse,
        } => cmd_list(tag, author, search, strict, sort, reverse, cli.json, cli.verbose),
        Commands::Tags { add } => cmd_tags(add, cli.json),
        Commands::Check { asset, registry } => cmd_check(&asset, &registry, cli.json, cli.verbose),
        Commands::Import { pack, project } => cmd_import(&pack, &project, cli.json),
        Commands::Status { project } => cmd_status(&project, cli.json),
    }
}

fn cmd_init(json: bool) -> Result<()> {
    let settings = VaultSettings::locate()?;
    let report = settings.initialize()?;
    let connected = settings.check_connection();

    if json {
        let output = serde_json::json!({
            "event": "init",
            "wrote_local": report.wrote_local,
            "wrote_global": report.wrote_global,
            "wrote_tags": report.wrote_tags,
            "connected": connected,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("📦 Vault Init");
    println!("Settings: {}", settings.settings_dir().display());
    for (wrote, label) in [
        (report.wrote_local, "local settings"),
        (report.wrote_global, "global settings"),
        (report.wrote_tags, "tag pool"),
    ] {
        if wrote {
            println!("  ✓ Generated {label}");
        } else {
            println!("  - Kept existing {label}");
        }
    }
    if connected {
        println!("✓ Library root is reachable");
    } else {
        println!("⚠ Library root is not reachable - edit LibraryPath in the global settings");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_publish(
    asset: &str,
    name: &str,
    author: Option<String>,
    description: &str,
    tags: Vec<String>,
    category: Category,
    registry_path: &Path,
    thumbnail: Option<PathBuf>,
    yes: bool,
    json: bool,
    verbose: u8,
) -> Result<()> {
    let settings = VaultSettings::locate()?;
    let registry = RegistrySnapshot::load(registry_path)
        .with_context(|| format!("loading registry snapshot {}", registry_path.display()))?;

    let request = PublishRequest {
        asset: asset.to_string(),
        pack_name: name.to_string(),
        author: author.unwrap_or_else(|| settings.developer_name()),
        description: description.to_string(),
        tags: tags.into_iter().collect(),
        category,
        thumbnail,
        merge_tags_into_pool: true,
    };
    request.validate()?;

    if !json {
        println!("📦 Vault Publish");
        println!("Asset: {asset}");
        println!("Pack:  {name}");
    }

    // Rebuild the index up front so both the duplicate gate and file-id
    // generation see the current library contents.
    let mut index = LibraryIndex::open(settings.library_root()?);
    index.rebuild();

    if index.find_by_pack_name(name).is_some() {
        let prompt = format!(
            "A pack named '{name}' already exists in the library. Publish anyway?"
        );
        if !confirm(&prompt, yes) {
            return abort("duplicate pack name", json);
        }
    }

    let report = hierarchy::inspect_asset(&registry, asset)?;
    if !report.badness.is_compliant() {
        if !json {
            print_hierarchy_warning(&report);
        }
        let prompt = format!(
            "Asset hierarchy is {} (badness {}). Publish anyway?",
            report.badness,
            report.badness.score()
        );
        if !confirm(&prompt, yes) {
            return abort("bad asset hierarchy", json);
        }
    }

    if verbose > 0 && !json {
        println!("\nPackaging {} objects:", report.dependencies.len());
        for dependency in &report.dependencies {
            println!("  - {dependency}");
        }
    }

    let outcome = publisher::publish(&settings, &registry, &index, &request, &report)?;

    if outcome.list_dir_fell_back_to_temp {
        eprintln!(
            "⚠ PackageListStoragePath is unusable, stored the file list in {}",
            outcome.file_list_path.parent().unwrap_or(Path::new("")).display()
        );
    }
    for unresolved in &outcome.unresolved {
        eprintln!("⚠ No source file for {unresolved}, skipped");
    }

    if json {
        let output = serde_json::json!({
            "event": "publish",
            "status": "success",
            "file_id": outcome.metadata.file_id,
            "archive": outcome.archive_path,
            "metadata": outcome.meta_path,
            "hierarchy_badness": outcome.metadata.hierarchy_badness,
            "objects": outcome.metadata.objects_in_pack.len(),
            "skipped": outcome.unresolved.len(),
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("\n✓ Packaging successful");
        println!("  File id: {}", outcome.metadata.file_id);
        println!("  Archive: {}", outcome.archive_path.display());
        if let Some(thumb) = &outcome.thumbnail_path {
            println!("  Thumbnail: {}", thumb.display());
        }
    }
    Ok(())
}

fn cmd_update(
    name: &str,
    author: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
    category: Option<Category>,
    json: bool,
) -> Result<()> {
    let settings = VaultSettings::locate()?;
    let mut index = LibraryIndex::open(settings.library_root()?);
    index.rebuild();

    let request = UpdateRequest {
        pack_name: name.to_string(),
        author,
        description,
        tags: tags.map(|t| t.into_iter().collect::<BTreeSet<String>>()),
        category,
        merge_tags_into_pool: true,
    };
    let updated = publisher::update_metadata(&settings, &index, &request)?;

    if json {
        let output = serde_json::json!({
            "event": "update",
            "status": "success",
            "file_id": updated.file_id,
            "last_modified": updated.last_modified,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("✓ Updated metadata for '{}' ({})", updated.pack_name, updated.file_id);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_list(
    tag: Vec<String>,
    author: Vec<String>,
    search: Option<String>,
    strict: bool,
    sort: SortType,
    reverse: bool,
    json: bool,
    verbose: u8,
) -> Result<()> {
    let settings = VaultSettings::locate()?;
    let index = LibraryIndex::scan(settings.library_root()?);

    let filter = LibraryFilter {
        tags: tag,
        authors: author,
        search,
        strict_search: strict,
    };
    let selected = index.browse(&filter, sort, reverse);

    if json {
        let records: Vec<&PackMetadata> = selected;
        println!("{}", serde_json::to_string(&records)?);
        return Ok(());
    }

    for record in &selected {
        let tags: Vec<&str> = record.tags.iter().map(String::as_str).collect();
        println!(
            "{}  {}  {}  [{}]",
            record.pack_name,
            record.author,
            record.category,
            tags.join(", ")
        );
        if verbose > 0 {
            println!("    id: {}  modified: {}", record.file_id, record.last_modified);
            println!("    {}", record.description);
        }
    }
    println!(
        "\n{} of {} packs in library",
        selected.len(),
        index.len()
    );
    Ok(())
}

fn cmd_tags(add: Vec<String>, json: bool) -> Result<()> {
    let settings = VaultSettings::locate()?;

    let pool = if add.is_empty() {
        settings.read_tags()
    } else {
        settings.merge_tags(&add.into_iter().collect())?
    };

    if json {
        println!("{}", serde_json::to_string(&pool)?);
        return Ok(());
    }

    for tag in &pool {
        println!("{tag}");
    }
    Ok(())
}

fn cmd_check(asset: &str, registry_path: &Path, json: bool, verbose: u8) -> Result<()> {
    let registry = RegistrySnapshot::load(registry_path)
        .with_context(|| format!("loading registry snapshot {}", registry_path.display()))?;
    let report = hierarchy::inspect_asset(&registry, asset)?;

    if json {
        let output = serde_json::json!({
            "event": "check",
            "asset": asset,
            "badness": report.badness.score(),
            "dependencies": report.dependencies,
            "offenders": report.offenders,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if report.badness.is_compliant() {
        println!("✓ {asset} is {} (badness 0)", report.badness);
    } else {
        println!(
            "⚠ {asset} is {} (badness {})",
            report.badness,
            report.badness.score()
        );
        print_hierarchy_warning(&report);
    }
    if verbose > 0 {
        println!("\n{} objects in closure:", report.dependencies.len());
        for dependency in &report.dependencies {
            println!("  - {dependency}");
        }
    }
    Ok(())
}

fn cmd_import(pack: &str, project: &Path, json: bool) -> Result<()> {
    let settings = VaultSettings::locate()?;
    let index = LibraryIndex::scan(settings.library_root()?);

    let outcome = importer::import_pack(&settings, &index, pack, project)?;

    if json {
        let output = serde_json::json!({
            "event": "import",
            "status": "success",
            "file_id": outcome.metadata.file_id,
            "extracted_to": outcome.extracted_to,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "✓ Imported '{}' into {}",
            outcome.metadata.pack_name,
            outcome.extracted_to.display()
        );
    }
    Ok(())
}

fn cmd_status(project: &Path, json: bool) -> Result<()> {
    let settings = VaultSettings::locate()?;
    let index = LibraryIndex::scan(settings.library_root()?);
    let report = importer::status_report(&index, project);

    if json {
        let entries: Vec<serde_json::Value> = report
            .iter()
            .map(|status| {
                serde_json::json!({
                    "pack": status.metadata.pack_name,
                    "file_id": status.metadata.file_id,
                    "state": status.state.to_string(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string(&entries)?);
        return Ok(());
    }

    for status in &report {
        let icon = match status.state {
            VersionState::UpToDate => "✓",
            VersionState::NotImported => "-",
            VersionState::NewerAvailable => "↑",
            VersionState::NewerAvailableObjectMissing | VersionState::ObjectMissing => "✗",
        };
        println!("{icon} {}  ({})", status.metadata.pack_name, status.state);
    }

    let imported = report
        .iter()
        .filter(|s| s.state != VersionState::NotImported)
        .count();
    println!("\n{imported} of {} packs imported", report.len());
    Ok(())
}

fn print_hierarchy_warning(report: &HierarchyReport) {
    match report.badness {
        HierarchyBadness::OutsideVault => {
            println!("The asset is not inside the /Game/Vault folder.");
        }
        HierarchyBadness::SplitInsideVault => {
            println!("Not every dependency sits in the asset's Vault subfolder:");
        }
        HierarchyBadness::EscapesVault => {
            println!("Some dependencies live outside the Vault folder entirely:");
        }
        HierarchyBadness::Scattered => {
            println!("The asset is outside Vault and its dependencies are scattered:");
        }
        HierarchyBadness::Compliant => return,
    }
    for offender in &report.offenders {
        println!("  - {offender}");
    }
}

/// Confirmation gate: `--yes` accepts, a non-interactive session declines,
/// otherwise ask.
fn confirm(prompt: &str, yes: bool) -> bool {
    if yes {
        return true;
    }
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return false;
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}

fn abort(reason: &str, json: bool) -> Result<()> {
    if json {
        let output = serde_json::json!({
            "event": "publish",
            "status": "aborted",
            "reason": reason,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Aborted: {reason}.");
    }
    Ok(())
}
