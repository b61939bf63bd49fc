///// Otter: CLI-Definition (Clap) – zwei Positionsargumente, nichts weiter.
///// Schneefuchs: DEVICE_ID darf nicht leer sein; Beispiele im Long-Help wie im alten C-Tool.
///// Maus: Nur Signaturen, keine Ausführungslogik.
///// Datei: src/cli.rs

use clap::builder::NonEmptyStringValueParser;
use clap::Parser;

const AFTER_HELP: &str = "\
Examples:

  Get the immediate parent:

      get-parent-device \"USBSTOR\\DISK&VEN_GENERIC&PROD_STORAGE_DEVICE&REV_0207\\000000000207&0\" \".*\"

  The \".*\" pattern causes the first parent found to be returned.

  Get the USB hub the device is connected to:

      get-parent-device \"USBSTOR\\DISK&VEN_GENERIC&PROD_STORAGE_DEVICE&REV_0207\\000000000207&0\" \".*\\\\ROOT_HUB.*\"

  The search walks up the device tree until a parent's Device Instance ID
  matches the pattern. If no ancestor matches, nothing is printed.";

#[derive(Parser, Debug)]
#[command(
    name = "get-parent-device",
    version,
    about = "Find the Device Instance ID of a device's parent in the PnP device tree",
    after_long_help = AFTER_HELP,
)]
pub struct Cli {
    /// Device Instance ID of the device whose parent is to be found
    /// (as reported by WMI, e.g. "USBSTOR\DISK&...\000000000207&0")
    #[arg(value_name = "DEVICE_ID", value_parser = NonEmptyStringValueParser::new())]
    pub device_id: String,

    /// Regular expression the parent's Device Instance ID must fully match
    #[arg(value_name = "PATTERN")]
    pub pattern: String,
}
