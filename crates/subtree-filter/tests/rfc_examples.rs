//! RFC 6241 section 6 examples run through the reader, writer and engine

use subtree_filter::netconf::{BASE_NAMESPACE, DATA, NOTIFICATION_NAMESPACE};
use subtree_filter::{
    apply_rpc_subtree_filter, apply_subtree_notification_filter, from_xml_str, AttributeMatch,
    ContainmentNode, ContentMatchNode, Document, Element, NamespaceSelector, Result,
    SelectionNode, SubtreeFilter,
};

const NS: &str = "http://example.com/schema/1.2/config";
const NS2: &str = "http://example.com/schema/1.2/config2";

fn exact(name: &str) -> NamespaceSelector {
    NamespaceSelector::exact(NS, name)
}

fn reply() -> Result<Document> {
    from_xml_str(&format!(
        r#"<rpc-reply message-id="101" xmlns="{BASE_NAMESPACE}">
             <data>
               <top xmlns="{NS}">
                 <users>
                   <user>
                     <name>root</name>
                     <type>superuser</type>
                     <full-name>Charlie Root</full-name>
                     <company-info><dept>1</dept><id>1</id></company-info>
                   </user>
                   <user>
                     <name>fred</name>
                     <type>admin</type>
                     <full-name>Fred Flintstone</full-name>
                     <company-info><dept>2</dept><id>2</id></company-info>
                   </user>
                   <user>
                     <name>barney</name>
                     <type>admin</type>
                     <full-name>Barney Rubble</full-name>
                     <company-info><dept>2</dept><id>3</id></company-info>
                   </user>
                 </users>
                 <interfaces>
                   <interface ifName="eth0"><mtu>1500</mtu></interface>
                   <interface ifName="eth1"><mtu>9000</mtu></interface>
                 </interfaces>
               </top>
             </data>
           </rpc-reply>"#
    ))
}

fn get(filter: &str) -> Result<Document> {
    from_xml_str(&format!(
        r#"<rpc message-id="101" xmlns="{BASE_NAMESPACE}"><get>{filter}</get></rpc>"#
    ))
}

/// `<top>` of the filtered reply
fn filtered_top(filter: &str) -> Result<Option<Element>> {
    let filtered = apply_rpc_subtree_filter(&get(filter)?, reply()?)?;
    let data = filtered
        .root
        .only_child_element_named(DATA, Some(BASE_NAMESPACE))?;
    let first = data.child_elements().next().cloned();
    Ok(first)
}

fn element(xml: &str) -> Result<Element> {
    Ok(from_xml_str(xml)?.root)
}

#[test]
fn test_read_rfc_examples() -> Result<()> {
    let cases = vec![
        (
            format!(r#"<filter type="subtree"><top xmlns="{NS}"/></filter>"#),
            SubtreeFilter::builder()
                .add(SelectionNode::builder(exact("top")).build())
                .build()?,
        ),
        (
            format!(
                r#"<filter type="subtree">
                     <t:top xmlns:t="{NS}">
                       <t:interfaces><t:interface t:ifName="eth0"/></t:interfaces>
                     </t:top>
                   </filter>"#
            ),
            SubtreeFilter::builder()
                .add(
                    ContainmentNode::builder(exact("top"))
                        .add(
                            ContainmentNode::builder(exact("interfaces"))
                                .add(
                                    SelectionNode::builder(exact("interface"))
                                        .add(AttributeMatch::new(exact("ifName"), "eth0"))
                                        .build(),
                                )
                                .build(),
                        )
                        .build(),
                )
                .build()?,
        ),
        (
            format!(r#"<filter type="subtree"><top xmlns="{NS}"><users/></top></filter>"#),
            SubtreeFilter::builder()
                .add(
                    ContainmentNode::builder(exact("top"))
                        .add(SelectionNode::builder(exact("users")).build())
                        .build(),
                )
                .build()?,
        ),
        (
            format!(
                r#"<filter type="subtree">
                     <top xmlns="{NS}">
                       <users xmlns=""/>
                     </top>
                   </filter>"#
            ),
            SubtreeFilter::builder()
                .add(
                    ContainmentNode::builder(exact("top"))
                        .add(SelectionNode::builder(NamespaceSelector::wildcard("users")).build())
                        .build(),
                )
                .build()?,
        ),
        (
            format!(
                r#"<filter type="subtree">
                     <a:top xmlns:a="{NS}" xmlns:b="{NS2}"><b:users/></a:top>
                   </filter>"#
            ),
            SubtreeFilter::builder()
                .add(
                    ContainmentNode::builder(exact("top"))
                        .add(
                            SelectionNode::builder(NamespaceSelector::exact(NS2, "users"))
                                .build(),
                        )
                        .build(),
                )
                .build()?,
        ),
    ];

    for (xml, expected) in cases {
        let filter = SubtreeFilter::from_xml_str(&xml)?;
        assert_eq!(filter, expected, "reading {xml}");
        assert_eq!(SubtreeFilter::from_xml_str(&filter.to_xml_string())?, filter);
    }
    Ok(())
}

#[test]
fn test_wildcard_subtree_reads_without_namespaces() -> Result<()> {
    let filter = SubtreeFilter::from_xml_str(
        r#"<filter type="subtree">
             <top xmlns=""><users><user><id>123</id></user></users></top>
           </filter>"#,
    )?;
    let expected = SubtreeFilter::builder()
        .add(
            ContainmentNode::builder(NamespaceSelector::wildcard("top"))
                .add(
                    ContainmentNode::builder(NamespaceSelector::wildcard("users"))
                        .add(
                            ContainmentNode::builder(NamespaceSelector::wildcard("user"))
                                .add(ContentMatchNode::new(
                                    NamespaceSelector::wildcard("id"),
                                    "123",
                                ))
                                .build(),
                        )
                        .build(),
                )
                .build(),
        )
        .build()?;
    assert_eq!(filter, expected);
    Ok(())
}

#[test]
fn test_pretty_tree_escapes_attribute_values() -> Result<()> {
    let filter = SubtreeFilter::builder()
        .add(
            ContainmentNode::builder(exact("top"))
                .add(
                    ContainmentNode::builder(exact("interfaces"))
                        .add(
                            SelectionNode::builder(exact("interface"))
                                .add(AttributeMatch::new(exact("ifName"), "'<>\"&"))
                                .build(),
                        )
                        .build(),
                )
                .build(),
        )
        .build()?;
    let expected = format!(
        "<a:top xmlns:a=\"{NS}\">\n\
         \x20 <a:interfaces>\n\
         \x20   <a:interface a:ifName=\"&apos;&lt;&gt;&quot;&amp;\"/>\n\
         \x20 </a:interfaces>\n\
         </a:top>"
    );
    assert_eq!(filter.pretty_tree(), expected);
    Ok(())
}

#[test]
fn test_full_selection_with_attribute_match() -> Result<()> {
    let data = element(&format!(
        r#"<data><top xmlns="{NS}"><interfaces>
             <interface ifName="eth0"><mtu>1500</mtu></interface>
             <interface ifName="eth1"/>
           </interfaces></top></data>"#
    ))?;
    let filter = SubtreeFilter::builder()
        .add(
            ContainmentNode::builder(exact("top"))
                .add(
                    ContainmentNode::builder(exact("interfaces"))
                        .add(
                            SelectionNode::builder(exact("interface"))
                                .add(AttributeMatch::new(
                                    NamespaceSelector::wildcard("ifName"),
                                    "eth0",
                                ))
                                .build(),
                        )
                        .build(),
                )
                .build(),
        )
        .build()?;

    let filtered = filter.apply_to_data(&data);
    let expected = element(&format!(
        r#"<data><top xmlns="{NS}"><interfaces>
             <interface ifName="eth0"><mtu>1500</mtu></interface>
           </interfaces></top></data>"#
    ))?;
    assert_eq!(filtered, expected);
    Ok(())
}

#[test]
fn test_select_entire_users_subtree() -> Result<()> {
    let top = filtered_top(&format!(
        r#"<filter type="subtree"><top xmlns="{NS}"><users/></top></filter>"#
    ))?;
    let users = top.as_ref().and_then(|top| top.child_elements().next());
    assert_eq!(users.map(|u| u.child_elements().count()), Some(3));
    assert_eq!(top.map(|t| t.child_elements().count()), Some(1));
    Ok(())
}

#[test]
fn test_list_entry_escalation() -> Result<()> {
    let top = filtered_top(&format!(
        r#"<filter type="subtree">
             <top xmlns="{NS}"><users><user><name>fred</name></user></users></top>
           </filter>"#
    ))?;
    let expected = element(&format!(
        r#"<top xmlns="{NS}"><users>
             <user>
               <name>fred</name>
               <type>admin</type>
               <full-name>Fred Flintstone</full-name>
               <company-info><dept>2</dept><id>2</id></company-info>
             </user>
           </users></top>"#
    ))?;
    assert_eq!(top, Some(expected));
    Ok(())
}

#[test]
fn test_specific_elements_from_entry() -> Result<()> {
    let top = filtered_top(&format!(
        r#"<filter type="subtree">
             <top xmlns="{NS}"><users><user>
               <name>fred</name>
               <type/>
               <full-name/>
             </user></users></top>
           </filter>"#
    ))?;
    let expected = element(&format!(
        r#"<top xmlns="{NS}"><users>
             <user>
               <name>fred</name>
               <type>admin</type>
               <full-name>Fred Flintstone</full-name>
             </user>
           </users></top>"#
    ))?;
    assert_eq!(top, Some(expected));
    Ok(())
}

#[test]
fn test_multiple_subtrees() -> Result<()> {
    let top = filtered_top(&format!(
        r#"<filter type="subtree">
             <top xmlns="{NS}">
               <users>
                 <user><name>root</name><company-info/></user>
                 <user><name>fred</name><company-info><id/></company-info></user>
                 <user>
                   <name>barney</name>
                   <type>superuser</type>
                   <company-info><dept/></company-info>
                 </user>
               </users>
             </top>
           </filter>"#
    ))?;
    let expected = element(&format!(
        r#"<top xmlns="{NS}"><users>
             <user>
               <name>root</name>
               <company-info><dept>1</dept><id>1</id></company-info>
             </user>
             <user>
               <name>fred</name>
               <company-info><id>2</id></company-info>
             </user>
           </users></top>"#
    ))?;
    assert_eq!(top, Some(expected));
    Ok(())
}

#[test]
fn test_content_mismatch_vetoes_entry() -> Result<()> {
    let top = filtered_top(&format!(
        r#"<filter type="subtree">
             <top xmlns="{NS}"><users><user>
               <name>fred</name>
               <type>superuser</type>
             </user></users></top>
           </filter>"#
    ))?;
    assert_eq!(top, None);
    Ok(())
}

#[test]
fn test_no_matching_element_yields_empty_data() -> Result<()> {
    assert_eq!(
        filtered_top(&format!(
            r#"<filter type="subtree"><top xmlns="{NS2}"/></filter>"#
        ))?,
        None
    );
    Ok(())
}

#[test]
fn test_wildcard_matches_any_namespace() -> Result<()> {
    let top = filtered_top(
        r#"<filter type="subtree"><top xmlns=""><interfaces/></top></filter>"#,
    )?;
    let names: Vec<String> = top
        .iter()
        .flat_map(|top| top.child_elements().map(|e| e.name.clone()))
        .collect();
    assert_eq!(names, vec!["interfaces".to_string()]);
    Ok(())
}

#[test]
fn test_non_subtree_filter_passes_through() -> Result<()> {
    for filter in [
        r#"<filter type="xpath" select="/top/users"/>"#,
        "",
    ] {
        let unchanged = apply_rpc_subtree_filter(&get(filter)?, reply()?)?;
        assert_eq!(unchanged, reply()?);
        assert_eq!(unchanged.to_xml_string(), reply()?.to_xml_string());
    }
    Ok(())
}

#[test]
fn test_typed_and_element_filters_agree() -> Result<()> {
    let text = format!(
        r#"<filter type="subtree">
             <top xmlns="{NS}">
               <users><user><name>barney</name></user></users>
               <interfaces><interface ifName="eth1"/></interfaces>
             </top>
           </filter>"#
    );
    let direct = apply_rpc_subtree_filter(&get(&text)?, reply()?)?;
    let typed = SubtreeFilter::from_xml_str(&text)?.apply_to_reply(&reply()?)?;
    assert_eq!(direct, typed);
    Ok(())
}

#[test]
fn test_typed_and_element_filters_agree_on_prefixed_content() -> Result<()> {
    let reply = from_xml_str(&format!(
        r#"<rpc-reply xmlns="{BASE_NAMESPACE}">
             <data>
               <ifaces xmlns="{NS}" xmlns:x="urn:iana:if-type">
                 <iface><type>x:ethernetCsmacd</type><mtu>1500</mtu></iface>
                 <iface><type>x:softwareLoopback</type><mtu>65536</mtu></iface>
               </ifaces>
             </data>
           </rpc-reply>"#
    ))?;
    let text = format!(
        r#"<filter type="subtree" xmlns:ift="urn:iana:if-type">
             <ifaces xmlns="{NS}"><iface><type>ift:ethernetCsmacd</type></iface></ifaces>
           </filter>"#
    );
    let direct = apply_rpc_subtree_filter(&get(&text)?, reply.clone())?;
    let typed = SubtreeFilter::from_xml_str(&text)?.apply_to_reply(&reply)?;
    assert_eq!(direct, typed);

    let data = typed.root.only_child_element_named(DATA, Some(BASE_NAMESPACE))?;
    let entries: Vec<String> = data
        .only_child_element()?
        .child_elements()
        .map(Element::to_xml_string)
        .collect();
    assert_eq!(
        entries,
        vec![format!(
            "<iface xmlns=\"{NS}\"><type>x:ethernetCsmacd</type><mtu>1500</mtu></iface>"
        )]
    );
    Ok(())
}

#[test]
fn test_builder_content_round_trips_through_xml() -> Result<()> {
    let filter = SubtreeFilter::builder()
        .add(
            ContainmentNode::builder(exact("user"))
                .add(ContentMatchNode::new(exact("name"), " fred "))
                .add(ContentMatchNode::qualified(exact("type"), "t:admin", NS2)?)
                .build(),
        )
        .build()?;
    assert_eq!(SubtreeFilter::from_xml_str(&filter.to_xml_string())?, filter);
    assert!(ContentMatchNode::try_new(exact("name"), "").is_err());
    Ok(())
}

fn notification(payload: &str) -> Result<Document> {
    from_xml_str(&format!(
        r#"<notification xmlns="{NOTIFICATION_NAMESPACE}">
             <eventTime>2007-07-08T00:01:00Z</eventTime>
             {payload}
           </notification>"#
    ))
}

#[test]
fn test_notification_suppressed_when_nothing_matches() -> Result<()> {
    let filter = element(&format!(
        r#"<filter type="subtree"><link-down xmlns="{NS}"/></filter>"#
    ))?;
    let payload = format!(r#"<link-up xmlns="{NS}"><if-name>eth0</if-name></link-up>"#);
    assert_eq!(
        apply_subtree_notification_filter(&filter, notification(&payload)?)?,
        None
    );
    Ok(())
}

#[test]
fn test_notification_keeps_selected_payload() -> Result<()> {
    let filter = element(&format!(
        r#"<filter type="subtree"><link-up xmlns="{NS}"><if-name/></link-up></filter>"#
    ))?;
    let payload = format!(
        r#"<link-up xmlns="{NS}"><if-name>eth0</if-name><speed>1000</speed></link-up>"#
    );
    let result = apply_subtree_notification_filter(&filter, notification(&payload)?)?;
    let expected = element(&format!(
        r#"<link-up xmlns="{NS}"><if-name>eth0</if-name></link-up>"#
    ))?;
    assert_eq!(result.map(|doc| doc.root), Some(expected));

    let typed = SubtreeFilter::read_from(&filter)?.apply_to_notification(notification(&payload)?)?;
    assert!(typed.is_some());
    Ok(())
}

#[test]
fn test_matched_empty_element_is_not_suppression() -> Result<()> {
    let filter = element(&format!(
        r#"<filter type="subtree"><heartbeat xmlns="{NS}"/></filter>"#
    ))?;
    let payload = format!(r#"<heartbeat xmlns="{NS}"/>"#);
    let result = apply_subtree_notification_filter(&filter, notification(&payload)?)?;
    let root = result.map(|doc| doc.root);
    assert_eq!(root.as_ref().map(|r| r.name.as_str()), Some("heartbeat"));
    assert_eq!(root.map(|r| r.children.is_empty()), Some(true));
    Ok(())
}
