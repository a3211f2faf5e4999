#![no_main]
use libfuzzer_sys::fuzz_target;
use subtree_filter::{apply_rpc_subtree_filter, from_xml_str};

const REPLY: &str = r#"<rpc-reply xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><data>
  <top xmlns="http://example.com/schema/1.2/config">
    <users><user><name>fred</name><type>admin</type></user></users>
    <interfaces><interface ifName="eth0"><mtu>1500</mtu></interface></interfaces>
  </top>
</data></rpc-reply>"#;

fuzz_target!(|data: &[u8]| {
    let Ok(filter) = std::str::from_utf8(data) else {
        return;
    };
    let request = format!(
        r#"<rpc xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><get>{filter}</get></rpc>"#
    );
    if let (Ok(request), Ok(reply)) = (from_xml_str(&request), from_xml_str(REPLY)) {
        let _ = apply_rpc_subtree_filter(&request, reply);
    }
});
