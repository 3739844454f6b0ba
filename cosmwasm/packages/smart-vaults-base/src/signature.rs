use cosmwasm_std::{Api, Uint128};
use sha2::{Digest, Sha256};

use crate::error::SmartVaultsError;

/// Swap terms signed off-chain by the swap signer.
pub struct SwapQuote<'a> {
    pub token_in: &'a str,
    pub token_out: &'a str,
    pub is_buy: bool,
    pub amount_in: Uint128,
    pub min_amount_out: Uint128,
    pub deadline: u64,
    pub data: &'a [u8],
}

impl SwapQuote<'_> {
    /// SHA-256 of the length-prefixed packing of every field, in declaration order.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update((self.token_in.len() as u32).to_be_bytes());
        hasher.update(self.token_in.as_bytes());
        hasher.update((self.token_out.len() as u32).to_be_bytes());
        hasher.update(self.token_out.as_bytes());
        hasher.update([self.is_buy as u8]);
        hasher.update(self.amount_in.u128().to_be_bytes());
        hasher.update(self.min_amount_out.u128().to_be_bytes());
        hasher.update(self.deadline.to_be_bytes());
        hasher.update((self.data.len() as u32).to_be_bytes());
        hasher.update(self.data);
        hasher.finalize().into()
    }

    /// Checks a 64-byte compact secp256k1 signature against the signer's SEC1 public key.
    pub fn verify(
        &self,
        api: &dyn Api,
        signature: &[u8],
        signer: &[u8],
    ) -> Result<(), SmartVaultsError> {
        match api.secp256k1_verify(&self.digest(), signature, signer) {
            Ok(true) => Ok(()),
            _ => Err(SmartVaultsError::InvalidSignature),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::MockApi;
    use k256::ecdsa::signature::hazmat::PrehashSigner;
    use k256::ecdsa::{Signature, SigningKey};

    fn quote(min_amount_out: u128) -> SwapQuote<'static> {
        SwapQuote {
            token_in: "usdc",
            token_out: "wnative",
            is_buy: false,
            amount_in: Uint128::new(200_000_000),
            min_amount_out: Uint128::new(min_amount_out),
            deadline: 1_700_000_000,
            data: b"route",
        }
    }

    fn sign(key: &SigningKey, quote: &SwapQuote) -> Vec<u8> {
        let signature: Signature = key.sign_prehash(&quote.digest()).unwrap();
        signature.to_bytes().to_vec()
    }

    #[test]
    fn accepts_signer_signature() {
        let key = SigningKey::from_slice(&[7u8; 32]).unwrap();
        let signer = key.verifying_key().to_encoded_point(true);
        let signature = sign(&key, &quote(150_000));

        quote(150_000)
            .verify(&MockApi::default(), &signature, signer.as_bytes())
            .unwrap();
    }

    #[test]
    fn rejects_tampered_quote_and_foreign_signer() {
        let key = SigningKey::from_slice(&[7u8; 32]).unwrap();
        let other = SigningKey::from_slice(&[9u8; 32]).unwrap();
        let signer = key.verifying_key().to_encoded_point(true);
        let signature = sign(&key, &quote(150_000));

        let err = quote(1)
            .verify(&MockApi::default(), &signature, signer.as_bytes())
            .unwrap_err();
        assert_eq!(err, SmartVaultsError::InvalidSignature);

        let foreign = sign(&other, &quote(150_000));
        let err = quote(150_000)
            .verify(&MockApi::default(), &foreign, signer.as_bytes())
            .unwrap_err();
        assert_eq!(err, SmartVaultsError::InvalidSignature);

        let err = quote(150_000)
            .verify(&MockApi::default(), b"garbage", signer.as_bytes())
            .unwrap_err();
        assert_eq!(err, SmartVaultsError::InvalidSignature);
    }

    #[test]
    fn digest_covers_direction() {
        let mut buy = quote(150_000);
        buy.is_buy = true;
        assert_ne!(buy.digest(), quote(150_000).digest());
    }
}
