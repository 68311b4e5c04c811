use std::collections::HashMap;

use lazy_static::lazy_static;

pub type Names = &'static [&'static str];

static COUNTRIES: &[&str] = &["India", "USA"];

lazy_static! {
    static ref STATES: HashMap<&'static str, Names> = HashMap::from([
        ("India", &["Maharashtra", "Delhi"] as Names),
        ("USA", &["California", "Texas"] as Names),
    ]);
    static ref CITIES: HashMap<&'static str, Names> = HashMap::from([
        ("Maharashtra", &["Mumbai", "Pune"] as Names),
        ("Delhi", &["New Delhi"] as Names),
        ("California", &["Los Angeles", "San Francisco"] as Names),
        ("Texas", &["Houston"] as Names),
    ]);
}

pub fn countries() -> Names {
    COUNTRIES
}

/// Unknown countries yield an empty list.
pub fn states(country: &str) -> Names {
    STATES.get(country).copied().unwrap_or(&[])
}

/// Unknown states yield an empty list.
pub fn cities(state: &str) -> Names {
    CITIES.get(state).copied().unwrap_or(&[])
}
