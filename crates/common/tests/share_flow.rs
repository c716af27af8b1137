//! The full sender -> receiver flow, minus the relay

use common::crypto::{derive_key, CodeScheme, SecretError, NONCE_SIZE, TAG_SIZE};
use common::prelude::Code;

#[test]
fn test_code_carries_everything_needed_to_decrypt() {
    let scheme = CodeScheme::default();
    let payload = b"diff --git a/README.md b/README.md\n+hello\n";

    // sender
    let code = scheme.generate().unwrap();
    let ciphertext = derive_key(code.passphrase())
        .unwrap()
        .encrypt(payload)
        .unwrap();
    let shared = code.to_string();
    assert_eq!(ciphertext.len(), NONCE_SIZE + payload.len() + TAG_SIZE);

    // receiver
    let received: Code = shared.parse().unwrap();
    assert_eq!(received.id(), code.id());
    let plaintext = derive_key(received.passphrase())
        .unwrap()
        .decrypt(&ciphertext)
        .unwrap();
    assert_eq!(plaintext, payload);
}

#[test]
fn test_code_id_does_not_affect_key() {
    let a: Code = "AAAAAAAAAA-alpha-bravo-charlie-delta".parse().unwrap();
    let b: Code = "ZZZZZZZZZZ-alpha-bravo-charlie-delta".parse().unwrap();

    let ciphertext = derive_key(a.passphrase())
        .unwrap()
        .encrypt(b"diff content")
        .unwrap();
    let plaintext = derive_key(b.passphrase())
        .unwrap()
        .decrypt(&ciphertext)
        .unwrap();
    assert_eq!(plaintext, b"diff content");
}

#[test]
fn test_independent_codes_do_not_decrypt_each_other() {
    let scheme = CodeScheme::default();

    for _ in 0..32 {
        let sender = scheme.generate().unwrap();
        let stranger = scheme.generate().unwrap();
        if sender.passphrase() == stranger.passphrase() {
            continue;
        }

        let ciphertext = derive_key(sender.passphrase())
            .unwrap()
            .encrypt(b"payload")
            .unwrap();
        let result = derive_key(stranger.passphrase())
            .unwrap()
            .decrypt(&ciphertext);
        assert!(matches!(result, Err(SecretError::DecryptionFailed)));
    }
}

#[test]
fn test_custom_scheme_codes_need_the_same_scheme() {
    let scheme = CodeScheme::new(6, 6);
    let code = scheme.generate().unwrap();

    assert!(scheme.parse(&code.to_string()).is_ok());
    // six words do not fit the default four-word scheme
    assert!(CodeScheme::default().parse(&code.to_string()).is_err());
}
