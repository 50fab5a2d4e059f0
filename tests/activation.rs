use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use tripmock::{
    default_transport, same_transport, set_default_transport, Client, Error, MockTransport,
    Passthrough, ResponseTemplate,
};

// The default transport is process-wide: tests touching it take turns.
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

fn mock_is_the_default() -> bool {
    same_transport(&default_transport(), &tripmock::default_mock())
}

/// A stand-in for the real transport, so that nothing goes over the network.
fn fake_network(body: &'static str) -> Arc<MockTransport> {
    let transport = MockTransport::new();
    transport.register_no_responder(Some(ResponseTemplate::new(200).set_body_string(body)));
    Arc::new(transport)
}

#[test]
fn registered_routes_are_served_while_active() {
    let _serial = serial();

    {
        // Arrange
        let _session = tripmock::session();
        tripmock::register_responder(
            "GET",
            "http://e.com/x",
            ResponseTemplate::new(200).set_body_string("ok"),
        );

        // Act
        let hit = Client::new().get("http://e.com/x").unwrap();
        let with_query = Client::new().get("http://e.com/x?a=1").unwrap();
        let miss = Client::new().get("http://e.com/y").unwrap_err();

        // Assert
        assert!(mock_is_the_default());
        assert_eq!(hit.status(), 200);
        assert_eq!(hit.body().as_ref(), b"ok");
        assert_eq!(with_query.body().as_ref(), b"ok");
        assert!(miss.is_no_responder_found());
    }

    // The session is over.
    assert!(!mock_is_the_default());
    assert!(same_transport(
        &default_transport(),
        &tripmock::initial_transport()
    ));
    assert!(tripmock::default_mock().is_empty());
}

#[test]
fn deactivate_restores_whatever_was_installed_before() {
    let _serial = serial();
    let network = fake_network("real");
    let previous = set_default_transport(network.clone());

    // Act
    tripmock::activate();
    let mocked = Client::new().get("http://e.com/").unwrap_err();
    tripmock::deactivate_and_reset();
    let restored = Client::new().get("http://e.com/").unwrap();

    // Assert
    assert!(mocked.is_no_responder_found());
    assert_eq!(restored.body().as_ref(), b"real");
    assert!(same_transport(&default_transport(), &network));
    assert!(same_transport(&tripmock::initial_transport(), &network));

    set_default_transport(previous);
}

#[test]
fn passthrough_reaches_the_initial_transport() {
    let _serial = serial();
    let previous = set_default_transport(fake_network("from the network"));

    {
        // Arrange
        let _session = tripmock::session();
        tripmock::register_responder(
            "GET",
            "http://e.com/mocked",
            ResponseTemplate::new(200).set_body_string("mocked"),
        );
        tripmock::register_no_responder(Some(Passthrough::new(tripmock::initial_transport())));

        // Act
        let mocked = Client::new().get("http://e.com/mocked").unwrap();
        let forwarded = Client::new().get("http://e.com/elsewhere").unwrap();

        // Assert
        assert_eq!(mocked.body().as_ref(), b"mocked");
        assert_eq!(forwarded.body().as_ref(), b"from the network");
    }

    set_default_transport(previous);
}

#[test]
fn non_default_activation_only_redirects_the_given_client() {
    let _serial = serial();

    // Arrange
    let own = fake_network("own transport");
    let client = Client::with_transport(own.clone());
    let default_before = default_transport();

    {
        let _session = tripmock::session_non_default(&client);
        tripmock::register_responder(
            "GET",
            "http://e.com/x",
            ResponseTemplate::new(202).set_body_string("mocked"),
        );

        // Act
        let response = client.get("http://e.com/x").unwrap();

        // Assert
        assert_eq!(response.status(), 202);
        assert!(same_transport(&client.transport().unwrap(), &tripmock::default_mock()));
        // The default transport was left alone.
        assert!(same_transport(&default_transport(), &default_before));
    }

    // The client got its own transport back.
    assert!(same_transport(&client.transport().unwrap(), &own));
    let response = client.get("http://e.com/x").unwrap();
    assert_eq!(response.body().as_ref(), b"own transport");
}

#[test]
fn non_default_activation_of_a_client_without_transport_restores_none() {
    let _serial = serial();
    let client = Client::new();

    tripmock::activate_non_default(&client);
    assert!(client.transport().is_some());
    tripmock::deactivate_and_reset();

    assert!(client.transport().is_none());
}

#[test]
fn deactivating_without_a_session_does_nothing() {
    let _serial = serial();
    let before = default_transport();

    // Act
    tripmock::deactivate();
    tripmock::deactivate();

    // Assert
    assert!(same_transport(&default_transport(), &before));
    // The next session is not affected.
    let _session = tripmock::session();
    assert!(mock_is_the_default());
}

#[test]
fn responders_survive_deactivate_but_not_reset() {
    let _serial = serial();

    tripmock::activate();
    tripmock::register_responder("GET", "http://e.com/kept", ResponseTemplate::new(200));
    tripmock::deactivate();
    assert_eq!(tripmock::default_mock().len(), 1);

    tripmock::activate();
    let response = Client::new().get("http://e.com/kept").unwrap();
    assert_eq!(response.status(), 200);

    tripmock::reset();
    assert!(tripmock::default_mock().is_empty());
    let error = Client::new().get("http://e.com/kept").unwrap_err();
    assert!(matches!(
        error,
        Error::Request { ref source, .. } if matches!(**source, Error::NoResponderFound)
    ));
    tripmock::deactivate();
}

#[test]
fn sessions_can_be_opened_and_closed_repeatedly() {
    let _serial = serial();
    let initial = default_transport();

    for i in 0..20 {
        tripmock::activate();
        tripmock::register_responder(
            "GET",
            format!("http://e.com/{}", i),
            ResponseTemplate::new(200),
        );
        assert!(mock_is_the_default());
        assert_eq!(tripmock::default_mock().len(), 1);
        tripmock::deactivate_and_reset();
        assert!(!mock_is_the_default());
    }

    assert!(same_transport(&default_transport(), &initial));
    assert!(tripmock::default_mock().is_empty());
}

#[test]
fn a_panicking_test_still_closes_its_session() {
    let _serial = serial();

    // Act
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let _session = tripmock::session();
        tripmock::register_responder("GET", "http://e.com/", ResponseTemplate::new(200));
        panic!("boom");
    }));

    // Assert
    assert!(outcome.is_err());
    assert!(!mock_is_the_default());
    assert!(tripmock::default_mock().is_empty());
    // Would block forever if the gate had not been released.
    let _session = tripmock::session();
    assert!(mock_is_the_default());
}

#[test]
fn the_catch_all_can_be_cleared() {
    let _serial = serial();
    let _session = tripmock::session();
    tripmock::register_no_responder(Some(ResponseTemplate::new(404)));
    assert_eq!(Client::new().get("http://e.com/any").unwrap().status(), 404);

    // Act
    tripmock::clear_no_responder();

    // Assert
    assert!(!tripmock::default_mock().has_no_responder());
    let error = Client::new().get("http://e.com/any").unwrap_err();
    assert!(error.is_no_responder_found());
}

#[test]
fn mocking_is_enabled_by_default() {
    assert!(!tripmock::disabled());
}
