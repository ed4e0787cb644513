use ztpinv_common::network::mac::Oui;

use super::{Classification, DeviceIdentity, Layer, VendorRepository, VendorStrategy};

const MAC_GROUPS: usize = 6;

fn groups(client_identifier: &str) -> Vec<&str> {
    client_identifier.split(':').collect()
}

fn lookup(repo: &dyn VendorRepository, mac: &str, layer: Layer) -> Option<Classification> {
    let oui = Oui::from_mac_str(mac)?;
    repo.get_vendor(oui).map(|vendor| Classification::new(vendor, layer))
}

/// A client identifier of exactly six colon-separated groups is a MAC address.
pub struct ClientIdMac;

impl VendorStrategy for ClientIdMac {
    fn classify(
        &self,
        identity: &DeviceIdentity<'_>,
        repo: &dyn VendorRepository,
    ) -> Option<Classification> {
        let client_id = identity.client_identifier?;
        if !client_id.contains(':') || groups(client_id).len() != MAC_GROUPS {
            return None;
        }
        lookup(repo, client_id, Layer::ClientIdMac)
    }
}

/// A client identifier longer than a MAC is decoded as hex text.
///
/// Switches commonly send their platform name here (`arista-...`). When the
/// decoded text does not start with a known vendor token, the first six
/// groups are tried as a MAC address.
pub struct ClientIdPayload {
    /// Lower-cased, longest first so that `arista-networks` beats `arista`.
    tokens: Vec<(String, String)>,
}

impl ClientIdPayload {
    pub fn new<I, S>(vendors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens: Vec<(String, String)> = vendors
            .into_iter()
            .map(|vendor| {
                let vendor: String = vendor.into();
                (vendor.to_lowercase(), vendor)
            })
            .filter(|(token, _)| !token.is_empty())
            .collect();
        tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { tokens }
    }

    fn vendor_in(&self, decoded: &str) -> Option<&str> {
        let text = decoded
            .trim_start_matches(|c: char| c.is_control() || c.is_whitespace())
            .to_lowercase();
        self.tokens
            .iter()
            .find(|(token, _)| text.starts_with(token.as_str()))
            .map(|(_, vendor)| vendor.as_str())
    }
}

/// Concatenates the groups and decodes them as UTF-8 text.
fn decode_payload(groups: &[&str]) -> Option<String> {
    let hex_digits: String = groups.iter().map(|g| format!("{g:0>2}")).collect();
    let bytes = hex::decode(hex_digits).ok()?;
    String::from_utf8(bytes).ok()
}

impl VendorStrategy for ClientIdPayload {
    fn classify(
        &self,
        identity: &DeviceIdentity<'_>,
        repo: &dyn VendorRepository,
    ) -> Option<Classification> {
        let client_id = identity.client_identifier?;
        let groups = groups(client_id);
        if groups.len() <= MAC_GROUPS {
            return None;
        }

        if let Some(vendor) = decode_payload(&groups).as_deref().and_then(|text| self.vendor_in(text)) {
            return Some(Classification::new(vendor, Layer::ClientIdPayload));
        }

        lookup(repo, &groups[..MAC_GROUPS].join(":"), Layer::ClientIdPrefix)
    }
}

/// The OUI of the device's own hardware address.
pub struct HardwareOui;

impl VendorStrategy for HardwareOui {
    fn classify(
        &self,
        identity: &DeviceIdentity<'_>,
        repo: &dyn VendorRepository,
    ) -> Option<Classification> {
        lookup(repo, identity.hardware_address, Layer::HardwareOui)
    }
}
