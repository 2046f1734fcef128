use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

pub const INAPPROPRIATE_USERNAME_MESSAGE: &str = "The user name you entered is inappropriate. \
     Please pick another and consider that our helpers are other users just like you.";

fn word_runs() -> &'static Regex {
    static WORD_RUNS: OnceLock<Regex> = OnceLock::new();
    WORD_RUNS.get_or_init(|| Regex::new(r"[A-Za-z0-9_]+").expect("valid word regex"))
}

fn non_word_characters() -> &'static Regex {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    NON_WORD.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid non-word regex"))
}

/// Every form of `username` that is compared against the blacklist: the
/// lowercased username, the same with punctuation removed, and each run of
/// word characters in it.
pub fn username_tokens(username: &str) -> HashSet<String> {
    let username = username.to_lowercase();
    let mut tokens = HashSet::new();
    tokens.insert(non_word_characters().replace_all(&username, "").into_owned());
    for run in word_runs().find_iter(&username) {
        tokens.insert(run.as_str().to_string());
    }
    tokens.insert(username);
    tokens
}

pub fn is_username_allowed(username: Option<&str>, blacklist: &[String]) -> bool {
    let username = match username {
        Some(username) if !username.is_empty() => username,
        _ => return false,
    };
    let tokens = username_tokens(username);
    !blacklist.iter().any(|word| tokens.contains(word))
}

/// Form rule: an empty username is left to the required check.
pub fn check_username(username: &str, blacklist: &[String]) -> Result<(), String> {
    if !username.is_empty() && !is_username_allowed(Some(username), blacklist) {
        return Err(INAPPROPRIATE_USERNAME_MESSAGE.to_string());
    }
    Ok(())
}
