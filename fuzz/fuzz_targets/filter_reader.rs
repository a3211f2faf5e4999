#![no_main]
use libfuzzer_sys::fuzz_target;
use subtree_filter::SubtreeFilter;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(filter) = SubtreeFilter::from_xml_str(s) {
            let written = filter.to_xml_string();
            assert_eq!(SubtreeFilter::from_xml_str(&written).ok(), Some(filter));
        }
    }
});
