//! Caller-facing surface.

use picnic3_core::{ParamSet, Params};
use picnic3_lowmc::{encrypt, BitVec, LowmcInstance};

use crate::error::Error;
use crate::{sign, verify};

/// A Picnic3 scheme instance: one parameter bundle plus its expanded LowMC.
///
/// Construction derives the LowMC matrices, which is the expensive part;
/// keep the instance around and reuse it across operations.
pub struct Picnic3 {
    params: Params,
    lowmc: LowmcInstance,
}

impl Picnic3 {
    /// Instantiate a named parameter set.
    #[must_use]
    pub fn new(set: ParamSet) -> Self {
        let params = *set.params();
        let lowmc = LowmcInstance::derive(&params);
        Self { params, lowmc }
    }

    /// Instantiate a custom parameter bundle.
    ///
    /// # Errors
    /// Rejects bundles violating the protocol invariants.
    pub fn with_params(params: Params) -> Result<Self, Error> {
        params.validate()?;
        let lowmc = LowmcInstance::derive(&params);
        Ok(Self { params, lowmc })
    }

    /// The active parameter bundle.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Compute the public key `LowMC(private_key, plaintext)`.
    ///
    /// This is not key generation: the caller supplies the private key; the
    /// scheme never samples entropy.
    ///
    /// # Errors
    /// [`Error::InputLength`] when a buffer does not match the parameter set.
    pub fn derive_public_key(
        &self,
        private_key: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        self.check_io(private_key)?;
        self.check_io(plaintext)?;
        let n = self.params.state_bits;
        let ct = encrypt(
            &self.lowmc,
            &BitVec::from_bytes(private_key, n),
            &BitVec::from_bytes(plaintext, n),
        );
        Ok(ct.to_bytes(self.params.io_size()))
    }

    /// Sign `message`. Deterministic: identical inputs give identical bytes.
    ///
    /// # Errors
    /// [`Error::InputLength`] for malformed buffers; [`Error::SigningFailed`]
    /// only on internal inconsistency.
    pub fn sign(
        &self,
        private_key: &[u8],
        pub_key: &[u8],
        plaintext: &[u8],
        message: &[u8],
    ) -> Result<Vec<u8>, Error> {
        self.check_io(private_key)?;
        self.check_io(pub_key)?;
        self.check_io(plaintext)?;
        sign::sign(
            &self.params,
            &self.lowmc,
            private_key,
            pub_key,
            plaintext,
            message,
        )
    }

    /// Verify `signature` over `message`.
    ///
    /// # Errors
    /// [`Error::InvalidSignature`] for any rejection;
    /// [`Error::InputLength`] for malformed key buffers.
    pub fn verify(
        &self,
        pub_key: &[u8],
        plaintext: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), Error> {
        self.check_io(pub_key)?;
        self.check_io(plaintext)?;
        verify::verify(
            &self.params,
            &self.lowmc,
            pub_key,
            plaintext,
            message,
            signature,
        )
    }

    fn check_io(&self, buf: &[u8]) -> Result<(), Error> {
        if buf.len() == self.params.io_size() {
            Ok(())
        } else {
            Err(Error::InputLength)
        }
    }
}
