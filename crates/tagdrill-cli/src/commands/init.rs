//! The `tagdrill init` command.

use std::path::Path;

use anyhow::{Context, Result};

use tagdrill_sources::DEFAULT_CONFIG_TOML;

pub fn execute() -> Result<()> {
    write_if_absent(Path::new("tagdrill.toml"), DEFAULT_CONFIG_TOML)?;

    std::fs::create_dir_all("data").context("failed to create data directory")?;
    for (name, content) in SAMPLE_TABLES {
        write_if_absent(&Path::new("data").join(name), content)?;
    }

    println!("\nNext steps:");
    println!("  1. Replace the tables in data/ with your plant's lists");
    println!("  2. Run: tagdrill validate");
    println!("  3. Run: tagdrill quiz --category equipment");

    Ok(())
}

fn write_if_absent(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_TABLES: [(&str, &str); 4] = [
    (
        "equipment.csv",
        "tag,name
P101A,原料输送泵
P101B,原料输送泵
E201,原料预热器
R301,加氢反应器
T401,产品储罐
",
    ),
    (
        "valves.csv",
        "tag,name,floor
XV101,原料泵入口切断阀,1F
XV102,原料泵出口切断阀,1F
FV201,预热器进料调节阀,2F
PV301,反应器压力调节阀,3F
",
    ),
    (
        "performance.csv",
        "tag,name,medium,power_kw,head_m,flow_m3h,speed_rpm,pressure_bar,diameter_m,length_m,volume_m3,rated_current_a
P101A,原料输送泵,石脑油,55,80,120,2950,,,,,102
P101B,原料输送泵,石脑油,55,80,250,2950,,,,,102
R301,加氢反应器,氢气/油气,,,,,45,2.4,12,50,
T401,产品储罐,汽油,,,,,,,,1000,
",
    ),
    (
        "standard.csv",
        "control_tag,name,tag,unit,standard
TIC-301,反应器入口温度,R301,℃,320~340
PIC-301,反应器压力,R301,bar,43~47
LIC-401,储罐液位,T401,%,20~80
",
    ),
];
