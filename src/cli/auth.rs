use crate::{
    SyncContext, error, info, success,
    types::{Credentials, Registration},
    utils, warning,
};

pub async fn login(ctx: &SyncContext, username: String, password: String) {
    let pb = utils::spinner(format!("Logging in as {}...", username));
    let result = ctx.login(&Credentials::new(username, password)).await;
    pb.finish_and_clear();

    match result {
        Ok(user) => success!("Logged in as {}", user.username),
        Err(e) => error!("Login failed: {}", e),
    }
}

pub async fn register(ctx: &SyncContext, username: String, email: String, password: String) {
    let registration = Registration {
        username,
        email,
        password,
    };

    let pb = utils::spinner("Creating account...");
    let result = ctx.register(&registration).await;
    pb.finish_and_clear();

    match result {
        Ok(user) => success!("Registered and logged in as {}", user.username),
        Err(e) => error!("Registration failed: {}", e),
    }
}

pub async fn logout(ctx: &SyncContext) {
    if !ctx.state().authenticated {
        warning!("Not logged in.");
    }
    ctx.logout().await;
    success!("Logged out");
}

pub async fn whoami(ctx: &SyncContext) {
    let state = ctx.state();
    match (state.authenticated, state.user) {
        (true, Some(user)) => match user.email {
            Some(email) => info!("Logged in as {} <{}> (id {})", user.username, email, user.id),
            None => info!("Logged in as {} (id {})", user.username, user.id),
        },
        (true, None) => info!("Logged in, user details unavailable"),
        (false, _) => warning!("Not logged in. Run `reelsync login`."),
    }
}

pub async fn profile(ctx: &SyncContext) {
    let pb = utils::spinner("Fetching profile...");
    let result = ctx.profile().await;
    pb.finish_and_clear();

    match result {
        Ok(profile) => {
            info!("User: {} (id {})", profile.user.username, profile.user.id);
            if let Some(email) = profile.user.email {
                info!("Email: {}", email);
            }
            if let Some(count) = profile.watchlist_count {
                info!("Watch later: {}", count);
            }
            if let Some(count) = profile.ratings_count {
                info!("Ratings: {}", count);
            }
        }
        Err(e) => error!("Cannot load profile: {}", e),
    }
}
