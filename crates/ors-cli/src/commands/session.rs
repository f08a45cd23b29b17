use anyhow::Result;
use colored::Colorize;
use ors_admin::store::{
    FCM_TOKEN, FIRST_NAME, IDENTITY_KEYS, LAST_NAME, LOGIN_ID, REFRESH_TOKEN, ROLE, TOKEN, USER_ID,
};
use ors_admin::{FileStore, KeyValueStore};

use crate::cli::SessionSetArgs;
use crate::output::{print_error, print_success};

pub fn set(store: &FileStore, args: &SessionSetArgs) -> Result<()> {
    // Start from a clean identity so fields from an older login don't linger.
    store.remove_all(&IDENTITY_KEYS)?;

    let fields = [
        (FIRST_NAME, Some(&args.first_name)),
        (LAST_NAME, args.last_name.as_ref()),
        (TOKEN, args.token.as_ref()),
        (REFRESH_TOKEN, args.refresh_token.as_ref()),
        (LOGIN_ID, args.login_id.as_ref()),
        (ROLE, args.role.as_ref()),
        (USER_ID, args.user_id.as_ref()),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            store.set(key, value)?;
        }
    }
    print_success(&format!(
        "Session stored for {} ({})",
        args.first_name.cyan(),
        store.path().display()
    ));
    Ok(())
}

pub fn show(store: &FileStore, profile: &str) -> Result<()> {
    let Some(first_name) = store.get(FIRST_NAME).filter(|v| !v.is_empty() && v != "null") else {
        print_error(&format!("Not logged in (profile: \"{profile}\")"));
        return Ok(());
    };

    println!("{}: {}", "Profile".cyan(), profile);
    let last_name = store.get(LAST_NAME).unwrap_or_default();
    println!("{}: {} {}", "User".cyan(), first_name, last_name);
    for (label, key) in [("Login", LOGIN_ID), ("Role", ROLE), ("User ID", USER_ID)] {
        if let Some(value) = store.get(key) {
            println!("{}: {}", label.cyan(), value);
        }
    }
    if let Some(token) = store.get(TOKEN) {
        println!("{}: {}", "Token".cyan(), preview(&token));
    }
    if let Some(token) = store.get(FCM_TOKEN) {
        println!("{}: {}", "Delivery token".cyan(), preview(&token));
    }
    Ok(())
}

pub fn clear(store: &FileStore) -> Result<()> {
    let had_session = IDENTITY_KEYS.iter().any(|k| store.get(k).is_some());
    store.remove_all(&IDENTITY_KEYS)?;
    if had_session {
        print_success("Logged out (session removed)");
    } else {
        println!("No session stored");
    }
    Ok(())
}

fn preview(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 20 {
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 8..].iter().collect();
        format!("{head}...{tail}")
    } else {
        token.to_string()
    }
}
