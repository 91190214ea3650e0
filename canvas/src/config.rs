use gd_raster::codec::{Capabilities, Limits};

/// Runtime settings for creating and decoding canvases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Config {
    /// What this build can do. True-color requests downgrade to palette without support.
    pub capabilities: Capabilities,
    /// Bounds on images read from files.
    pub limits: Limits,
}

impl Config {
    /// A configuration without true-color support.
    pub fn palette_only() -> Self {
        Config {
            capabilities: Capabilities {
                true_color: false,
                ..Capabilities::compiled()
            },
            ..Config::default()
        }
    }
}
