use tabled::Table;

use crate::{
    SyncContext, error, info,
    types::{LibraryTableRow, MovieId, StatusKind},
    success, utils,
};

pub async fn sync(ctx: &SyncContext) {
    require_session(ctx);

    let pb = utils::spinner("Syncing lists and ratings...");
    let result = ctx.sync().await;
    pb.finish_and_clear();

    if let Err(e) = result {
        error!("Sync failed: {}", e);
    }

    let snapshot = ctx.statuses().snapshot();
    success!(
        "Synced {} liked, {} watch later, {} watched, {} rated",
        snapshot.liked.len(),
        snapshot.watch_later.len(),
        snapshot.watched.len(),
        ctx.ratings().snapshot().len()
    );
}

pub async fn status(ctx: &SyncContext, movie_id: String) {
    let id = parse_id(&movie_id);
    require_session(ctx);
    hydrate(ctx).await;

    let row = utils::status_row(id, &ctx.statuses().snapshot(), ctx.ratings());
    println!("{}", Table::new(vec![row]));
}

pub async fn library(ctx: &SyncContext) {
    require_session(ctx);

    let pb = utils::spinner("Fetching lists...");
    let result = ctx.library().await;
    pb.finish_and_clear();

    let lists = match result {
        Ok(lists) => lists,
        Err(e) => error!("Cannot load lists: {}", e),
    };

    let rows: Vec<LibraryTableRow> = StatusKind::ALL
        .into_iter()
        .flat_map(|kind| utils::library_rows(kind, lists.records(kind)))
        .collect();

    if rows.is_empty() {
        info!("All lists are empty.");
        return;
    }
    println!("{}", Table::new(rows));
}

pub async fn toggle(ctx: &SyncContext, kind: StatusKind, movie_id: String) {
    let id = parse_id(&movie_id);
    require_session(ctx);

    let pb = utils::spinner(format!("Updating {} for movie {}...", kind, id));
    let result = ctx.toggle(kind, id).await;
    pb.finish_and_clear();

    match result {
        Ok(true) => success!("Movie {} added to {}", id, kind),
        Ok(false) => success!("Movie {} removed from {}", id, kind),
        Err(e) => error!("Cannot update {}: {}", kind, e),
    }
}

pub async fn rate(ctx: &SyncContext, movie_id: String, rating: f64) {
    let id = parse_id(&movie_id);
    require_session(ctx);

    match ctx.rate(id, rating).await {
        Ok(()) => success!("Rated movie {} with {}", id, utils::format_rating(rating)),
        Err(e) => error!("Cannot save rating: {}", e),
    }
}

pub async fn rating(ctx: &SyncContext, movie_id: String) {
    let id = parse_id(&movie_id);
    require_session(ctx);

    match ctx.refresh_rating(id).await {
        Ok(r) if r > 0.0 => info!("Movie {} is rated {}", id, utils::format_rating(r)),
        Ok(_) => info!("Movie {} is not rated", id),
        Err(e) => error!("Cannot load rating: {}", e),
    }
}

fn parse_id(raw: &str) -> MovieId {
    match raw.parse::<MovieId>() {
        Ok(id) => id,
        Err(e) => error!("{}", e),
    }
}

fn require_session(ctx: &SyncContext) {
    if !ctx.state().authenticated {
        error!("Not logged in. Run `reelsync login` first.");
    }
}

async fn hydrate(ctx: &SyncContext) {
    if ctx.statuses().is_hydrated() && ctx.ratings().is_hydrated() {
        return;
    }

    let pb = utils::spinner("Syncing lists and ratings...");
    let result = ctx.ensure_hydrated().await;
    pb.finish_and_clear();

    if let Err(e) = result {
        error!("Sync failed: {}", e);
    }
}
