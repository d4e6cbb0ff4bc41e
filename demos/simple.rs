//! Structured decode and encode with `schema!`.
//!
//! Run with: cargo run --example simple

use lvmconf::{from_str_into, schema, to_string};
use std::error::Error;

#[derive(Debug, Default, PartialEq)]
struct LvmConfig {
    config: ConfigSection,
    devices: DevicesSection,
}

#[derive(Debug, Default, PartialEq)]
struct ConfigSection {
    checks: i64,
    profile_dir: String,
}

#[derive(Debug, Default, PartialEq)]
struct DevicesSection {
    dir: String,
    scan_lvs: i64,
}

schema! { impl Schema for LvmConfig { "config" => config, "devices" => devices } }
schema! { impl Section for ConfigSection { "checks" => checks, "profile_dir" => profile_dir } }
schema! { impl Section for DevicesSection { "dir" => dir, "scan_lvs" => scan_lvs } }

fn main() -> Result<(), Box<dyn Error>> {
    let lvm = LvmConfig {
        config: ConfigSection {
            checks: 1,
            profile_dir: "/etc/lvm/profile".to_string(),
        },
        devices: DevicesSection {
            dir: "/dev".to_string(),
            scan_lvs: 0,
        },
    };

    let text = to_string(&lvm)?;
    println!("lvm.conf output:\n{}", text);

    let mut back = LvmConfig::default();
    from_str_into(&text, &mut back)?;
    assert_eq!(lvm, back);
    println!("✓ Round-trip successful");

    Ok(())
}
