//! Port enumeration on the host

use motionkit_communication::{find_sutter_ports, list_ports, resolve_port};

#[test]
fn test_sutter_ports_are_a_subset_of_all_ports() {
    // Enumeration may legitimately fail in sandboxed environments.
    let (Ok(all), Ok(sutter)) = (list_ports(), find_sutter_ports()) else {
        return;
    };

    for port in &sutter {
        assert!(port.is_sutter());
        assert!(all.iter().any(|p| p.port_name == port.port_name));
    }
}

#[test]
fn test_auto_resolution_matches_discovery() {
    let Ok(sutter) = find_sutter_ports() else {
        return;
    };

    match resolve_port("auto") {
        Ok(path) => assert_eq!(Some(&path), sutter.first().map(|p| &p.port_name)),
        Err(e) => {
            assert!(sutter.is_empty());
            assert!(e.is_connection_error());
        }
    }
}
