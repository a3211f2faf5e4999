#![no_main]
use libfuzzer_sys::fuzz_target;
use subtree_filter::from_xml_bytes;

fuzz_target!(|data: &[u8]| {
    if let Ok(document) = from_xml_bytes(data) {
        let _ = document.to_pretty_string();
    }
});
