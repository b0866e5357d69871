use super::*;
use crate::Error;
use crate::MembershipError;

#[test]
fn accepts_host_port_addresses() {
    assert!(validate_address("n1", "localhost:5001").is_ok());
    assert!(validate_address("n1", "10.0.0.7:80").is_ok());
    assert!(validate_address("n1", "[::1]:5001").is_ok());
    assert!(NodeMeta::new("n1", "node-1.test:8080").validate().is_ok());
}

#[test]
fn rejects_malformed_addresses() {
    for address in ["localhost", ":5001", "localhost:", "localhost:0", "localhost:70000", "local host:1"] {
        let err = validate_address("n1", address).unwrap_err();
        assert!(
            matches!(err, Error::Membership(MembershipError::InvalidAddress { .. })),
            "{address} should be rejected"
        );
    }
}
