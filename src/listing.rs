// src/listing.rs
use std::cmp::Ordering;

use crate::models::server::ServerEntry;
use crate::storage::{RepositoryError, ServerRepository};
use crate::utils::now_unix;

// Sweeps entries whose heartbeat has lapsed, then returns the remaining
// servers in presentation order.
pub async fn live_servers(
    repository: &dyn ServerRepository,
    timeout_secs: u64,
) -> Result<Vec<ServerEntry>, RepositoryError> {
    let cutoff = now_unix().saturating_sub(timeout_secs);
    repository.remove_older_than(cutoff).await?;

    let mut servers = repository.get_all().await?;
    servers.sort_by(compare_servers);
    Ok(servers)
}

// Busiest first, open servers before locked ones, newest version, then name.
// Addresses and port close out any remaining tie so the order never depends
// on map iteration.
pub fn compare_servers(a: &ServerEntry, b: &ServerEntry) -> Ordering {
    b.players
        .cmp(&a.players)
        .then_with(|| a.requires_password.cmp(&b.requires_password))
        .then_with(|| compare_versions(&b.version, &a.version))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.addresses.cmp(&b.addresses))
        .then_with(|| a.port.cmp(&b.port))
}

enum Segment<'a> {
    Number(&'a str),
    Text(&'a str),
}

fn segments(input: &str) -> Vec<Segment<'_>> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    while start < bytes.len() {
        let numeric = bytes[start].is_ascii_digit();
        let mut end = start + 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() == numeric {
            end += 1;
        }
        let run = &input[start..end];
        out.push(if numeric { Segment::Number(run) } else { Segment::Text(run) });
        start = end;
    }
    out
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    // More significant digits means a larger number; same count falls back
    // to digit order.
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

// Version-aware comparison: digit runs compare as whole numbers rather than
// character by character, so "1.10" sorts above "1.9". Digit runs order
// before text runs, and a string that is a prefix of another is smaller.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = segments(a);
    let right = segments(b);
    let mut left = left.iter();
    let mut right = right.iter();
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(Segment::Number(x)), Some(Segment::Number(y))) => {
                let ord = compare_numeric(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(Segment::Text(x)), Some(Segment::Text(y))) => {
                let ord = x.cmp(y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(Segment::Number(_)), Some(Segment::Text(_))) => return Ordering::Less,
            (Some(Segment::Text(_)), Some(Segment::Number(_))) => return Ordering::Greater,
        }
    }
}
