use comfy_table::{Table, presets};
use netshare::{BackendKind, is_registered};

pub fn execute() -> anyhow::Result<()> {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_header(vec!["BACKEND", "AVAILABLE"]);

    for kind in BackendKind::ALL {
        let available = if is_registered(kind) { "yes" } else { "no" };
        table.add_row(vec![kind.as_str(), available]);
    }

    println!("{table}");
    Ok(())
}
