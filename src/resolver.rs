//! In-game display name to broadcaster channel resolution
//!
//! A static lookup table: exact match first, then a case-insensitive
//! fallback. Absence is a valid outcome, not an error; unresolved
//! victims simply drop out of the pipeline.

use std::collections::HashMap;

use crate::types::BroadcasterId;

pub struct IdentityResolver {
    exact: HashMap<String, String>,
    folded: HashMap<String, String>,
}

impl IdentityResolver {
    /// Build a resolver from (display name, channel login) pairs
    pub fn from_table(entries: &[(&str, &str)]) -> Self {
        let mut exact = HashMap::new();
        let mut folded = HashMap::new();
        for (name, login) in entries {
            exact.insert((*name).to_string(), (*login).to_string());
            folded.insert(name.to_lowercase(), (*login).to_string());
        }
        Self { exact, folded }
    }

    /// Resolver over the built-in streamer table
    pub fn with_known_streamers() -> Self {
        Self::from_table(KNOWN_STREAMERS)
    }

    /// Map a display name to a broadcaster channel login
    pub fn resolve(&self, display_name: &str) -> Option<BroadcasterId> {
        self.exact
            .get(display_name)
            .or_else(|| self.folded.get(&display_name.to_lowercase()))
            .map(|login| BroadcasterId(login.clone()))
    }
}

/// Known display-name to channel mappings for streamers active in the
/// game. Extend as new names show up in kill feeds.
const KNOWN_STREAMERS: &[(&str, &str)] = &[
    ("Aculite", "aculite"),
    ("Stodeh", "stodeh"),
    ("TheTacticalBrit", "thetacticalbrit"),
    ("xQc", "xqc"),
    ("Shroud", "shroud"),
    ("DrDisRespect", "drdisrespect"),
    ("Ninja", "ninja"),
    ("Swagg", "swagg"),
    ("Nickmercs", "nickmercs"),
    ("TimTheTatman", "timthetatman"),
    ("Valkyrae", "valkyrae"),
    ("Summit1g", "summit1g"),
    ("LIRIK", "lirik"),
    ("Sodapoppin", "sodapoppin"),
    ("Asmongold", "zackrawrr"),
    ("Jacksepticeye", "jacksepticeye"),
    ("PewDiePie", "pewdiepie"),
    ("CoryxKenshin", "coryxkenshin"),
    ("MrBeastGaming", "mrbeastgaming"),
    ("SypherPK", "sypherpk"),
    ("DrLupo", "drlupo"),
    ("Myth", "myth"),
    ("Tfue", "tfue"),
    ("Clix", "clix"),
    ("Bugha", "bugha"),
    ("Loserfruit", "loserfruit"),
    ("Pokimane", "pokimanelol"),
    ("Amouranth", "amouranth"),
    ("IShowSpeed", "ishowspeed"),
    ("KaiCenat", "kaicenat"),
    ("Westie", "westie"),
    ("Jackfrags", "jackfrags"),
    ("LevelCap", "levelcapgaming"),
    ("TheActMan", "theactman"),
];
