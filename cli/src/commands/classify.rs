use colored::*;
use tracing::warn;
use ztpinv_common::config::Config;
use ztpinv_common::network::mac::{self, Oui};
use ztpinv_core::vendors::{DeviceIdentity, VendorClassifier};

use crate::commands::ClassifyArgs;
use crate::terminal::{colors, print};

pub fn classify(args: &ClassifyArgs, quiet: u8) -> anyhow::Result<()> {
    let classifier = VendorClassifier::from_config(&Config::from(args));
    let hardware_address = mac::normalize(&args.mac);
    let client_identifier = args.client_id.as_deref().map(mac::normalize);

    let result = classifier.classify(&DeviceIdentity {
        hardware_address: &hardware_address,
        client_identifier: client_identifier.as_deref(),
    });

    print::header("classification", quiet);
    print::aligned_line("Hardware address", &hardware_address);
    match mac::parse_mac(&hardware_address) {
        Some(parsed) => print::aligned_line("OUI", Oui::from_mac(parsed)),
        None => warn!("{hardware_address} is not a six-group MAC address"),
    }
    if let Some(client_id) = &client_identifier {
        print::aligned_line("Client id", client_id);
    }
    print::aligned_line("Matched by", result.layer.to_string().color(colors::ACCENT));
    println!("{}", result.vendor);
    Ok(())
}
