//! Envelope encryption and decryption.
//!
//! Both directions work in place on a buffer of the final size, so the only
//! allocation per row is the output value itself.

use aes_gcm::aead::{generic_array::GenericArray, AeadInPlace};
use thiserror::Error;
use zeroize::Zeroize;

use super::context::CipherContext;
use super::nonce::Nonce;
use super::size::{Envelope, EnvelopeParts};
use super::{OVERHEAD, TAG_LEN};

/// Largest plaintext or associated data GCM accepts (2^36 bytes).
const GCM_MAX_INPUT: u64 = 1 << 36;

/// Errors produced by the codec.
///
/// [`CodecError::AuthenticationFailed`] carries no detail: the tag check
/// cannot tell a modified nonce from a modified ciphertext, tag or associated
/// data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The envelope is shorter than the fixed nonce + tag overhead.
    #[error("ciphertext is too short ({actual}) expected at least {minimum}")]
    InputTooShort { actual: usize, minimum: usize },

    /// The authentication tag did not verify.
    #[error("failed to verify ciphertext")]
    AuthenticationFailed,

    /// The primitive rejected its input for a reason other than verification.
    #[error("aead operation failed")]
    Internal,
}

/// Encrypt `plaintext` under `nonce`, binding `associated_data`.
///
/// Returns an envelope of exactly `plaintext.len() + OVERHEAD` bytes. The
/// caller must advance its nonce sequence after a successful call.
///
/// # Errors
///
/// Returns [`CodecError::Internal`] only if the plaintext or associated data
/// exceed the GCM input limits.
pub fn encrypt(
    ctx: &CipherContext,
    nonce: &Nonce,
    plaintext: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Envelope, CodecError> {
    let ad = associated_data.unwrap_or_default();
    if exceeds_gcm_limit(plaintext.len()) || exceeds_gcm_limit(ad.len()) {
        return Err(CodecError::Internal);
    }

    let mut envelope = Envelope::for_plaintext(plaintext.len());
    let parts = envelope.parts_mut();
    parts.nonce.copy_from_slice(nonce);
    parts.ciphertext.copy_from_slice(plaintext);

    let tag = ctx
        .cipher()
        .encrypt_in_place_detached(GenericArray::from_slice(nonce), ad, parts.ciphertext)
        .map_err(|_| CodecError::Internal)?;
    parts.tag.copy_from_slice(&tag);

    Ok(envelope)
}

/// Verify and decrypt an envelope produced by [`encrypt`].
///
/// Returns a plaintext of exactly `envelope.len() - OVERHEAD` bytes.
///
/// # Errors
///
/// - [`CodecError::InputTooShort`] if `envelope` is shorter than [`OVERHEAD`].
/// - [`CodecError::AuthenticationFailed`] if the tag does not match the nonce,
///   ciphertext and associated data.
/// - [`CodecError::Internal`] if the ciphertext or associated data exceed the
///   GCM input limits.
pub fn decrypt(
    ctx: &CipherContext,
    envelope: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Vec<u8>, CodecError> {
    let parts = Envelope::parse(envelope).ok_or(CodecError::InputTooShort {
        actual: envelope.len(),
        minimum: OVERHEAD,
    })?;
    let ad = associated_data.unwrap_or_default();
    if exceeds_gcm_limit(parts.ciphertext.len()) || exceeds_gcm_limit(ad.len()) {
        return Err(CodecError::Internal);
    }
    debug_assert_eq!(parts.tag.len(), TAG_LEN);

    let mut plaintext = parts.ciphertext.to_vec();
    open_in_place(ctx, &parts, ad, &mut plaintext)?;
    Ok(plaintext)
}

/// Decrypt `buffer` in place against the nonce and tag in `parts`.
///
/// On failure `buffer` holds unauthenticated output; it is zeroed and cleared
/// before returning.
fn open_in_place(
    ctx: &CipherContext,
    parts: &EnvelopeParts<'_>,
    ad: &[u8],
    buffer: &mut Vec<u8>,
) -> Result<(), CodecError> {
    let opened = ctx.cipher().decrypt_in_place_detached(
        GenericArray::from_slice(parts.nonce),
        ad,
        buffer.as_mut_slice(),
        GenericArray::from_slice(parts.tag),
    );
    if opened.is_err() {
        buffer.zeroize();
        return Err(CodecError::AuthenticationFailed);
    }
    Ok(())
}

fn exceeds_gcm_limit(len: usize) -> bool {
    len as u64 > GCM_MAX_INPUT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key::KeyBytes;
    use crate::crypto::nonce::NonceSequencer;
    use crate::crypto::{KEY_LEN, NONCE_LEN};

    fn zero_ctx() -> CipherContext {
        CipherContext::derive(&KeyBytes::new([0u8; KEY_LEN]))
    }

    fn seal(ctx: &CipherContext, plaintext: &[u8], ad: Option<&[u8]>) -> Vec<u8> {
        let seq = NonceSequencer::start();
        encrypt(ctx, seq.current(), plaintext, ad).unwrap().into_bytes()
    }

    #[test]
    fn hello_with_zero_key() {
        let ctx = zero_ctx();
        let envelope = seal(&ctx, b"hello", None);
        assert_eq!(envelope.len(), 33);
        assert_eq!(decrypt(&ctx, &envelope, None).unwrap(), b"hello");
        assert_eq!(
            decrypt(&ctx, &envelope, Some(&b"x"[..])).unwrap_err(),
            CodecError::AuthenticationFailed
        );
    }

    #[test]
    fn empty_plaintext_round_trip() {
        let ctx = zero_ctx();
        let envelope = seal(&ctx, b"", None);
        assert_eq!(envelope.len(), OVERHEAD);
        assert_eq!(decrypt(&ctx, &envelope, None).unwrap(), b"");
    }

    #[test]
    fn round_trip_with_associated_data() {
        let ctx = zero_ctx();
        for plaintext in [&b""[..], &b"a"[..], &b"123-45-6789"[..], &[0xAB; 1000][..]] {
            for ad in [None, Some(&b"row-42"[..]), Some(&[0u8; 3][..])] {
                let envelope = seal(&ctx, plaintext, ad);
                assert_eq!(envelope.len(), plaintext.len() + OVERHEAD);
                let opened = decrypt(&ctx, &envelope, ad).unwrap();
                assert_eq!(opened, plaintext);
            }
        }
    }

    #[test]
    fn absent_and_empty_ad_are_equivalent() {
        let ctx = zero_ctx();
        let envelope = seal(&ctx, b"secret", None);
        assert!(decrypt(&ctx, &envelope, Some(&b""[..])).is_ok());
        let envelope = seal(&ctx, b"secret", Some(&b""[..]));
        assert!(decrypt(&ctx, &envelope, None).is_ok());
        assert_eq!(
            decrypt(&ctx, &envelope, Some(&b"other"[..])).unwrap_err(),
            CodecError::AuthenticationFailed
        );
    }

    #[test]
    fn nonce_is_envelope_prefix() {
        let ctx = zero_ctx();
        let nonce = [9u8; NONCE_LEN];
        let envelope = encrypt(&ctx, &nonce, b"abc", None).unwrap();
        assert_eq!(&envelope.as_bytes()[..NONCE_LEN], &nonce);
        assert_eq!(envelope.plaintext_len(), 3);
    }

    #[test]
    fn ciphertext_differs_from_plaintext() {
        let ctx = zero_ctx();
        let envelope = seal(&ctx, b"plaintext-visible", None);
        assert_ne!(&envelope[NONCE_LEN..NONCE_LEN + 17], b"plaintext-visible");
    }

    #[test]
    fn every_bit_flip_is_detected() {
        let ctx = zero_ctx();
        let ad: &[u8] = b"ad";
        let envelope = seal(&ctx, b"hi", Some(ad));
        for i in 0..envelope.len() * 8 {
            let mut tampered = envelope.clone();
            tampered[i / 8] ^= 1 << (i % 8);
            assert_eq!(
                decrypt(&ctx, &tampered, Some(ad)).unwrap_err(),
                CodecError::AuthenticationFailed,
                "bit {i}"
            );
        }
        for i in 0..ad.len() * 8 {
            let mut tampered_ad = ad.to_vec();
            tampered_ad[i / 8] ^= 1 << (i % 8);
            assert_eq!(
                decrypt(&ctx, &envelope, Some(tampered_ad.as_slice())).unwrap_err(),
                CodecError::AuthenticationFailed
            );
        }
    }

    #[test]
    fn failed_open_leaves_no_output() {
        let ctx = zero_ctx();
        let mut envelope = seal(&ctx, b"sensitive value", None);
        envelope[NONCE_LEN] ^= 0x80;
        let parts = Envelope::parse(&envelope).unwrap();

        let mut buffer = parts.ciphertext.to_vec();
        assert_eq!(
            open_in_place(&ctx, &parts, &[], &mut buffer).unwrap_err(),
            CodecError::AuthenticationFailed
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let envelope = seal(&zero_ctx(), b"secret", None);
        let other = CipherContext::derive(&KeyBytes::new([1u8; KEY_LEN]));
        assert_eq!(
            decrypt(&other, &envelope, None).unwrap_err(),
            CodecError::AuthenticationFailed
        );
    }

    #[test]
    fn short_envelopes_are_rejected() {
        let ctx = zero_ctx();
        for len in 0..OVERHEAD {
            let err = decrypt(&ctx, &vec![0u8; len], None).unwrap_err();
            assert_eq!(
                err,
                CodecError::InputTooShort {
                    actual: len,
                    minimum: OVERHEAD
                }
            );
        }
    }

    #[test]
    fn too_short_message_reports_lengths() {
        let err = decrypt(&zero_ctx(), &[0u8; 5], None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains('5') && msg.contains("28"), "{msg}");
    }

    #[test]
    fn gcm_limit_check() {
        assert!(!exceeds_gcm_limit(0));
        assert!(!exceeds_gcm_limit(1 << 20));
    }
}
