/// Platform slugs the in-browser emulator can run.
pub const EMULATOR_PLATFORMS: &[&str] = &[
    "3do",
    "64dd",
    "amiga",
    "amiga-cd",
    "amiga-cd32",
    "arcade",
    "neogeoaes",
    "neogeomvs",
    "atari2600",
    "atari-2600-plus",
    "atari5200",
    "atari7800",
    "c-plus-4",
    "c64",
    "cpet",
    "commodore-64c",
    "c128",
    "commmodore-128",
    "colecovision",
    "jaguar",
    "lynx",
    "atari-lynx-mkii",
    "neo-geo-pocket",
    "neo-geo-pocket-color",
    "nes",
    "famicom",
    "fds",
    "game-televisison",
    "new-style-nes",
    "n64",
    "ique-player",
    "nds",
    "nintendo-ds-lite",
    "nintendo-dsi",
    "nintendo-dsi-xl",
    "gb",
    "game-boy-pocket",
    "game-boy-light",
    "gba",
    "game-boy-adavance-sp",
    "game-boy-micro",
    "gbc",
    "pc-fx",
    "ps",
    "psp",
    "segacd",
    "sega32",
    "gamegear",
    "sms",
    "sega-mark-iii",
    "sega-game-box-9",
    "sega-master-system-ii",
    "master-system-super-compact",
    "master-system-girl",
    "genesis-slash-megadrive",
    "sega-mega-drive-2-slash-genesis",
    "sega-mega-jet",
    "mega-pc",
    "tera-drive",
    "sega-nomad",
    "saturn",
    "snes",
    "sfam",
    "super-nintendo-original-european-version",
    "super-famicom-shvc-001",
    "super-famicom-jr-model-shvc-101",
    "new-style-super-nes-model-sns-101",
    "turbografx16--1",
    "vic-20",
    "virtualboy",
    "wonderswan",
    "swancrystal",
    "wonderswan-color",
];

/// Keys inside `hasheous_metadata` that mark a dump as verified.
pub const VERIFICATION_FLAGS: &[&str] = &[
    "tosec_match",
    "mame_arcade_match",
    "mame_mess_match",
    "nointro_match",
    "redump_match",
    "whdload_match",
    "ra_match",
    "fbneo_match",
];

/// Name of the per-user collection that backs favourites (compared case-insensitively).
pub const FAVOURITES_COLLECTION: &str = "favourites";

pub mod status {
    pub const NOW_PLAYING: &str = "now_playing";

    pub const BACKLOGGED: &str = "backlogged";

    pub const HIDDEN: &str = "hidden";
}

pub mod limits {

    pub const DEFAULT_PAGE_SIZE: u64 = 72;

    pub const MAX_PAGE_SIZE: u64 = 500;

    /// Most values bound into one `IN (...)` list. Stays under SQLite's
    /// historical limit of 999 host parameters per statement.
    pub const SQL_BATCH_SIZE: usize = 900;
}
