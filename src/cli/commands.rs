use crate::cli::tree::{self, describe_category, margin};
use crate::config::Config;
use crate::models::{
    ActivityUpdate, BundleUpdate, CategoryUpdate, EntityId, ExportFormat, LinkUpdate, NewActivity,
    NewBundle, NewCategory, NewLink, SharedBundle, SocialMediaType,
    decode_share_code, default_export_file_name, export_to_file, extract_share_code,
    import_from_file, parse_time, share_url,
};
use crate::search::{self, LinkFilter};
use crate::store::{SharedImportOptions, StateStore};
use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, NaiveDate};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Which collection an id argument refers to
#[derive(Debug, Clone, Copy)]
enum Kind {
    Link,
    Category,
    Bundle,
    Activity,
}

impl Kind {
    fn label(&self) -> &'static str {
        match self {
            Kind::Link => "link",
            Kind::Category => "category",
            Kind::Bundle => "bundle",
            Kind::Activity => "activity",
        }
    }
}

/// Resolve a full id, a unique id prefix, or a name/title
/// (exact, case insensitive) to an entity id
fn resolve(store: &StateStore, kind: Kind, needle: &str) -> Result<EntityId> {
    let state = store.state();
    let entries: Vec<(&EntityId, &str)> = match kind {
        Kind::Link => state.links.iter().map(|l| (&l.id, l.title.as_str())).collect(),
        Kind::Category => state
            .categories
            .iter()
            .map(|c| (&c.id, c.name.as_str()))
            .collect(),
        Kind::Bundle => state.bundles.iter().map(|b| (&b.id, b.name.as_str())).collect(),
        Kind::Activity => state
            .activities
            .iter()
            .map(|a| (&a.id, a.title.as_str()))
            .collect(),
    };

    let needle = needle.trim();
    if let Some((id, _)) = entries.iter().find(|(id, _)| id.as_str() == needle) {
        return Ok((*id).clone());
    }

    let by_prefix: Vec<_> = entries
        .iter()
        .filter(|(id, _)| !needle.is_empty() && id.as_str().starts_with(needle))
        .collect();
    if by_prefix.len() == 1 {
        return Ok(by_prefix[0].0.clone());
    }
    if by_prefix.len() > 1 {
        bail!("'{}' matches {} {}s, use a longer id", needle, by_prefix.len(), kind.label());
    }

    let lowered = needle.to_lowercase();
    let by_name: Vec<_> = entries
        .iter()
        .filter(|(_, name)| name.to_lowercase() == lowered)
        .collect();
    match by_name.as_slice() {
        [(id, _)] => Ok((*id).clone()),
        [] => Err(anyhow!("No {} found matching '{}'", kind.label(), needle)),
        many => bail!(
            "'{}' matches {} {}s by name, use the id instead",
            needle,
            many.len(),
            kind.label()
        ),
    }
}

fn resolve_all(store: &StateStore, kind: Kind, needles: &[String]) -> Result<Vec<EntityId>> {
    needles
        .iter()
        .map(|needle| resolve(store, kind, needle))
        .collect()
}

/// Turn a value flag and its `--clear-*` flag into a nullable update
fn nullable<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear { Some(None) } else { value.map(Some) }
}

fn non_blank(field: &str, value: Option<&str>) -> Result<Option<String>> {
    match value.map(str::trim) {
        Some("") => bail!("{} cannot be empty", field),
        other => Ok(other.map(str::to_string)),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", raw))
}

fn success(message: impl AsRef<str>) {
    println!("{}  {} {}", margin(), "✓".bright_green(), message.as_ref());
}

fn not_found(kind: Kind, id: &EntityId) {
    println!("{}  No {} with id {}", margin(), kind.label(), id);
}

pub fn list(
    store: &StateStore,
    category: Option<&str>,
    highlighted: bool,
    search: Option<&str>,
) -> Result<()> {
    let category_id = match category {
        Some(name) => Some(
            tree::find_category_by_name(store.state(), name)
                .ok_or_else(|| anyhow!("No category found with name: {}", name))?,
        ),
        None => None,
    };

    let filter = LinkFilter {
        query: search.unwrap_or_default().to_string(),
        category_id,
        highlighted_only: highlighted,
    };
    tree::display_tree(store.state(), &filter);
    Ok(())
}

pub struct AddLinkArgs<'a> {
    pub title: &'a str,
    pub url: &'a str,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub highlight: bool,
    pub platform: Option<&'a str>,
}

pub fn add_link(store: &mut StateStore, args: AddLinkArgs<'_>) -> Result<()> {
    let title = args.title.trim();
    let url = args.url.trim();
    if title.is_empty() || url.is_empty() {
        bail!("A link needs both a title and a URL");
    }

    let category_id = match args.category {
        Some(name) => tree::find_category_by_name(store.state(), name)
            .ok_or_else(|| anyhow!("No category found with name: {}", name))?,
        None => store
            .state()
            .categories
            .first()
            .map(|c| c.id.clone())
            .unwrap_or_else(EntityId::empty),
    };

    let social_media_type = match args.platform {
        Some(name) => Some(
            SocialMediaType::parse(name)
                .ok_or_else(|| anyhow!("Unknown platform '{}' (telegram, discord, x)", name))?,
        ),
        None => SocialMediaType::detect(url),
    };

    if search::is_duplicate_url(store.state(), url) {
        println!(
            "{}  {} a link with this URL already exists",
            margin(),
            "note:".bright_yellow()
        );
    }

    let link = store.add_link(NewLink {
        title: title.to_string(),
        url: url.to_string(),
        description: args.description.unwrap_or_default().trim().to_string(),
        category_id,
        is_highlighted: args.highlight,
        social_media_type,
        order: None,
    });
    success(format!("Added link {} [{}]", link.title.bold(), link.id));
    Ok(())
}

#[derive(Default)]
pub struct EditLinkArgs<'a> {
    pub title: Option<&'a str>,
    pub url: Option<&'a str>,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub highlighted: Option<bool>,
    pub platform: Option<&'a str>,
    pub clear_platform: bool,
    pub order: Option<i64>,
    pub clear_order: bool,
}

pub fn edit_link(
    store: &mut StateStore,
    needle: &str,
    args: EditLinkArgs<'_>,
) -> Result<()> {
    let id = resolve(store, Kind::Link, needle)?;

    let category_id = match args.category {
        Some(name) => Some(
            tree::find_category_by_name(store.state(), name)
                .ok_or_else(|| anyhow!("No category found with name: {}", name))?,
        ),
        None => None,
    };
    let platform = match args.platform {
        Some(name) => Some(
            SocialMediaType::parse(name)
                .ok_or_else(|| anyhow!("Unknown platform '{}' (telegram, discord, x)", name))?,
        ),
        None => None,
    };

    let update = LinkUpdate {
        title: non_blank("Title", args.title)?,
        url: non_blank("URL", args.url)?,
        description: args.description.map(|d| d.trim().to_string()),
        category_id,
        is_highlighted: args.highlighted,
        social_media_type: nullable(platform, args.clear_platform),
        order: nullable(args.order, args.clear_order),
    };
    if update.title.is_none()
        && update.url.is_none()
        && update.description.is_none()
        && update.category_id.is_none()
        && update.is_highlighted.is_none()
        && update.social_media_type.is_none()
        && update.order.is_none()
    {
        bail!("Nothing to change");
    }

    if store.update_link(&id, update) {
        success(format!("Updated link {}", id));
    } else {
        not_found(Kind::Link, &id);
    }
    Ok(())
}

pub fn delete_link(store: &mut StateStore, needle: &str) -> Result<()> {
    let id = resolve(store, Kind::Link, needle)?;
    if store.delete_link(&id) {
        success(format!("Deleted link {}", id));
    } else {
        not_found(Kind::Link, &id);
    }
    Ok(())
}

pub fn toggle_highlight(store: &mut StateStore, needle: &str) -> Result<()> {
    let id = resolve(store, Kind::Link, needle)?;
    store.toggle_highlight(&id);
    let highlighted = store.state().link(&id).is_some_and(|l| l.is_highlighted);
    success(if highlighted {
        "Link highlighted"
    } else {
        "Link no longer highlighted"
    });
    Ok(())
}

pub fn reorder(store: &mut StateStore, needles: &[String]) -> Result<()> {
    let ids = resolve_all(store, Kind::Link, needles)?;
    store.reorder_links(&ids);
    success(format!("Reordered {} links", ids.len()));
    Ok(())
}

pub fn categories(store: &StateStore) -> Result<()> {
    if store.state().categories.is_empty() {
        println!("{}  No categories found.", margin());
        return Ok(());
    }
    tree::list_all_categories(store.state());
    Ok(())
}

pub fn add_category(
    store: &mut StateStore,
    name: &str,
    color: &str,
    icon: Option<&str>,
) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("A category needs a name");
    }
    let category = store.add_category(NewCategory {
        name: name.to_string(),
        color: color.to_string(),
        icon: icon.map(str::to_string),
    });
    success(format!("Added category {}", describe_category(&category)));
    Ok(())
}

pub fn edit_category(
    store: &mut StateStore,
    needle: &str,
    name: Option<&str>,
    color: Option<&str>,
    icon: Option<&str>,
    clear_icon: bool,
) -> Result<()> {
    let id = resolve(store, Kind::Category, needle)?;
    let update = CategoryUpdate {
        name: non_blank("Name", name)?,
        color: color.map(str::to_string),
        icon: nullable(icon.map(str::to_string), clear_icon),
    };
    if update.name.is_none() && update.color.is_none() && update.icon.is_none() {
        bail!("Nothing to change");
    }

    store.update_category(&id, update);
    match store.state().category(&id) {
        Some(category) => success(format!("Updated category {}", describe_category(category))),
        None => not_found(Kind::Category, &id),
    }
    Ok(())
}

pub fn delete_category(store: &mut StateStore, needle: &str) -> Result<()> {
    let id = resolve(store, Kind::Category, needle)?;
    let moved = store
        .state()
        .links
        .iter()
        .filter(|l| l.category_id == id)
        .count();
    if store.delete_category(&id) {
        success(format!("Deleted category, {} links reassigned", moved));
    } else {
        not_found(Kind::Category, &id);
    }
    Ok(())
}

pub fn bundles(store: &StateStore) -> Result<()> {
    tree::display_bundles(store.state());
    Ok(())
}

pub fn add_bundle(
    store: &mut StateStore,
    name: &str,
    description: Option<&str>,
    links: &[String],
) -> Result<()> {
    let link_ids = resolve_all(store, Kind::Link, links)?;
    let bundle = store.add_bundle(NewBundle {
        name: name.trim().to_string(),
        description: description.unwrap_or_default().to_string(),
        link_ids,
    });
    success(format!(
        "Created bundle {} with {} links [{}]",
        bundle.name.bold(),
        bundle.link_ids.len(),
        bundle.id
    ));
    Ok(())
}

pub struct EditBundleArgs<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub add: &'a [String],
    pub remove: &'a [String],
}

pub fn edit_bundle(
    store: &mut StateStore,
    needle: &str,
    args: EditBundleArgs<'_>,
) -> Result<()> {
    let id = resolve(store, Kind::Bundle, needle)?;
    let to_add = resolve_all(store, Kind::Link, args.add)?;
    let to_remove = resolve_all(store, Kind::Link, args.remove)?;

    let link_ids = if to_add.is_empty() && to_remove.is_empty() {
        None
    } else {
        let mut bundle = store
            .state()
            .bundle(&id)
            .cloned()
            .ok_or_else(|| anyhow!("No bundle with id {}", id))?;
        for link_id in &to_remove {
            bundle.remove_link(link_id);
        }
        for link_id in to_add {
            bundle.add_link(link_id);
        }
        Some(bundle.link_ids)
    };

    let update = BundleUpdate {
        name: non_blank("Name", args.name)?,
        description: args.description.map(str::to_string),
        link_ids,
    };
    if update.name.is_none() && update.description.is_none() && update.link_ids.is_none() {
        bail!("Nothing to change");
    }

    if store.update_bundle(&id, update) {
        let count = store.state().bundle(&id).map_or(0, |b| b.link_ids.len());
        success(format!("Updated bundle {} ({} links)", id, count));
    } else {
        not_found(Kind::Bundle, &id);
    }
    Ok(())
}

pub fn delete_bundle(store: &mut StateStore, needle: &str) -> Result<()> {
    let id = resolve(store, Kind::Bundle, needle)?;
    if store.delete_bundle(&id) {
        success(format!("Deleted bundle {}", id));
    } else {
        not_found(Kind::Bundle, &id);
    }
    Ok(())
}

pub fn share(store: &mut StateStore, config: &Config, needle: &str) -> Result<()> {
    let id = resolve(store, Kind::Bundle, needle)?;
    let code = store
        .generate_bundle_share_code(&id)
        .ok_or_else(|| anyhow!("No bundle with id {}", id))?;

    println!("{}  {}", margin(), "SHARE CODE".bright_green().bold());
    println!("{}  {}", margin(), code);
    println!("{}  {}", margin(), "SHARE URL".bright_green().bold());
    println!("{}  {}", margin(), share_url(&config.share_base_url, &code));
    Ok(())
}

pub fn decode(input: &str) -> Result<()> {
    let code = extract_share_code(input);
    let bundle = decode_share_code(&code).context("Invalid share code")?;

    println!(
        "{}  {} {}",
        margin(),
        "BUNDLE".bright_green().bold(),
        bundle.name.bold()
    );
    if let Some(description) = bundle.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{}  {}", margin(), description.italic());
    }
    for (idx, link) in bundle.links.iter().enumerate() {
        println!(
            "{}  {}. {} {}",
            margin(),
            (idx + 1).to_string().bright_yellow(),
            link.title.bright_white(),
            link.url.bright_black().italic()
        );
    }
    Ok(())
}

pub fn import_share(
    store: &mut StateStore,
    input: &str,
    include_duplicates: bool,
) -> Result<()> {
    let code = extract_share_code(input);
    let bundle = decode_share_code(&code).context("Invalid share code")?;

    let options = SharedImportOptions {
        selection: None,
        include_duplicates,
    };
    let added = store.import_shared_bundle(&bundle, &options)?;
    let skipped = skipped_duplicates(&bundle, added);

    success(format!(
        "Imported {} of {} links from {}",
        added,
        bundle.links.len(),
        bundle.name.bold()
    ));
    if skipped > 0 {
        println!(
            "{}  {} skipped as duplicates (use --all to import them anyway)",
            margin(),
            skipped
        );
    }
    Ok(())
}

/// Every shared link that did not land in the store, including repeats inside
/// the payload itself.
fn skipped_duplicates(bundle: &SharedBundle, added: usize) -> usize {
    bundle.links.len().saturating_sub(added)
}

pub fn schedule(store: &StateStore, upcoming: Option<usize>) -> Result<()> {
    let state = store.state();
    if state.activities.is_empty() {
        println!("{}  No scheduled activities.", margin());
        return Ok(());
    }

    if let Some(limit) = upcoming {
        let today = Local::now().date_naive();
        let activities = search::upcoming_activities(state, today, limit);
        println!("{}  {}", margin(), "UPCOMING".bright_yellow().bold());
        if activities.is_empty() {
            println!("{}  Nothing coming up.", margin());
        }
        for activity in activities {
            print_activity(state, activity, true);
        }
        return Ok(());
    }

    for (date, activities) in search::activities_by_date(state) {
        println!(
            "{}  {}",
            margin(),
            date.format("%a %Y-%m-%d").to_string().bright_blue().bold()
        );
        for activity in activities {
            print_activity(state, activity, false);
        }
    }
    Ok(())
}

fn print_activity(
    state: &crate::models::AppState,
    activity: &crate::models::ScheduledActivity,
    with_date: bool,
) {
    let check = if activity.is_completed {
        "[x]".bright_green()
    } else {
        "[ ]".normal()
    };
    let when = match (with_date, activity.time) {
        (true, Some(time)) => format!("{} {}", activity.date, time.format("%H:%M")),
        (true, None) => activity.date.to_string(),
        (false, Some(time)) => time.format("%H:%M").to_string(),
        (false, None) => "--:--".to_string(),
    };

    println!(
        "{}  {} {} {} {}",
        margin(),
        check,
        when.bright_cyan(),
        activity.title.bright_white(),
        format!("[{}]", activity.id.short()).bright_black()
    );
    for link in search::links_for_activity(state, activity) {
        println!("{}        {} {}", margin(), "↳".bright_black(), link.url.italic());
    }
}

pub struct AddActivityArgs<'a> {
    pub title: &'a str,
    pub date: &'a str,
    pub time: Option<&'a str>,
    pub description: Option<&'a str>,
    pub links: &'a [String],
    pub color: Option<&'a str>,
}

pub fn add_activity(store: &mut StateStore, args: AddActivityArgs<'_>) -> Result<()> {
    let date = parse_date(args.date)?;
    let time = match args.time {
        Some(raw) => Some(
            parse_time(raw).ok_or_else(|| anyhow!("Invalid time '{}', expected HH:MM", raw))?,
        ),
        None => None,
    };
    let link_ids = resolve_all(store, Kind::Link, args.links)?;

    let activity = store.add_activity(NewActivity {
        title: args.title.trim().to_string(),
        description: args.description.unwrap_or_default().to_string(),
        date,
        time,
        link_ids,
        color: args.color.map(str::to_string),
        is_completed: false,
    });
    success(format!(
        "Scheduled {} on {} [{}]",
        activity.title.bold(),
        activity.date,
        activity.id
    ));
    Ok(())
}

#[derive(Default)]
pub struct EditActivityArgs<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub date: Option<&'a str>,
    pub time: Option<&'a str>,
    pub clear_time: bool,
    pub add: &'a [String],
    pub remove: &'a [String],
    pub color: Option<&'a str>,
    pub clear_color: bool,
}

pub fn edit_activity(
    store: &mut StateStore,
    needle: &str,
    args: EditActivityArgs<'_>,
) -> Result<()> {
    let id = resolve(store, Kind::Activity, needle)?;

    let date = match args.date {
        Some(raw) => Some(parse_date(raw)?),
        None => None,
    };
    let time = match args.time {
        Some(raw) => Some(
            parse_time(raw).ok_or_else(|| anyhow!("Invalid time '{}', expected HH:MM", raw))?,
        ),
        None => None,
    };

    let to_add = resolve_all(store, Kind::Link, args.add)?;
    let to_remove = resolve_all(store, Kind::Link, args.remove)?;
    let link_ids = if to_add.is_empty() && to_remove.is_empty() {
        None
    } else {
        let mut activity = store
            .state()
            .activity(&id)
            .cloned()
            .ok_or_else(|| anyhow!("No activity with id {}", id))?;
        for link_id in &to_remove {
            activity.remove_link(link_id);
        }
        for link_id in to_add {
            if !activity.link_ids.contains(&link_id) {
                activity.link_ids.push(link_id);
            }
        }
        Some(activity.link_ids)
    };

    let update = ActivityUpdate {
        title: non_blank("Title", args.title)?,
        description: args.description.map(str::to_string),
        date,
        time: nullable(time, args.clear_time),
        link_ids,
        color: nullable(args.color.map(str::to_string), args.clear_color),
        is_completed: None,
    };
    if update.title.is_none()
        && update.description.is_none()
        && update.date.is_none()
        && update.time.is_none()
        && update.link_ids.is_none()
        && update.color.is_none()
    {
        bail!("Nothing to change");
    }

    if store.update_activity(&id, update) {
        success(format!("Updated activity {}", id));
    } else {
        not_found(Kind::Activity, &id);
    }
    Ok(())
}

pub fn complete(store: &mut StateStore, needle: &str) -> Result<()> {
    let id = resolve(store, Kind::Activity, needle)?;
    store.toggle_activity_complete(&id);
    let done = store.state().activity(&id).is_some_and(|a| a.is_completed);
    success(if done {
        "Marked complete"
    } else {
        "Marked not complete"
    });
    Ok(())
}

pub fn delete_activity(store: &mut StateStore, needle: &str) -> Result<()> {
    let id = resolve(store, Kind::Activity, needle)?;
    if store.delete_activity(&id) {
        success(format!("Deleted activity {}", id));
    } else {
        not_found(Kind::Activity, &id);
    }
    Ok(())
}

pub fn export(store: &StateStore, path: Option<&Path>, yaml: bool) -> Result<()> {
    let format = if yaml {
        ExportFormat::Yaml
    } else {
        ExportFormat::Json
    };
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(default_export_file_name(
            Local::now().date_naive(),
            format,
        )),
    };

    export_to_file(store.state(), &path, format)?;
    success(format!("Exported data to {}", path.display()));
    Ok(())
}

pub fn import(store: &mut StateStore, path: &Path) -> Result<()> {
    let state = import_from_file(path)?;
    let stats = state.stats();
    store.import_data(state);
    success(format!(
        "Imported {} links, {} categories, {} bundles, {} activities",
        stats.links, stats.categories, stats.bundles, stats.activities
    ));
    Ok(())
}

pub fn clear(store: &mut StateStore, confirmed: bool) -> Result<()> {
    if !confirmed {
        bail!("This deletes every link, bundle and activity. Re-run with --yes to confirm");
    }
    store.clear_all_data();
    success("All data cleared, default categories restored");
    Ok(())
}

pub fn stats(store: &StateStore) -> Result<()> {
    let stats = store.stats();
    println!("{}  {}", margin(), "CURRENT DATA".bold());
    for (label, count) in [
        ("Links", stats.links),
        ("Categories", stats.categories),
        ("Bundles", stats.bundles),
        ("Activities", stats.activities),
    ] {
        println!(
            "{}  {:<12} {}",
            margin(),
            label.bright_white(),
            count.to_string().bright_yellow()
        );
    }
    if let Some(storage) = store.storage() {
        println!(
            "{}  {:<12} {}",
            margin(),
            "Stored in".bright_white(),
            storage.state_file().display().to_string().bright_black()
        );
    }
    Ok(())
}

pub fn backup(store: &StateStore) -> Result<()> {
    let storage = store
        .storage()
        .context("No storage attached to this session")?;
    let path = storage.backup().context("Failed to back up state")?;
    success(format!("Backup written to {}", path.display()));
    Ok(())
}
