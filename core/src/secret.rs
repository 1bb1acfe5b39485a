use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::*;

const CIPHERTEXT_LEN: usize = core::mem::size_of::<Number>();

/// The secret number kept only in encrypted form.
///
/// The key and IV are stored next to the ciphertext, so this keeps the number out of plain sight in a save file
/// without pretending to be a security boundary.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedSecret {
    #[serde(with = "base64_bytes")]
    ciphertext: [u8; CIPHERTEXT_LEN],
    #[serde(with = "base64_bytes")]
    key: [u8; 32],
    #[serde(with = "base64_bytes")]
    iv: [u8; 16],
}

impl SealedSecret {
    /// Encrypts `value` under a fresh key and IV drawn from `rng`.
    pub fn seal(value: Number, rng: &mut StdRng) -> Self {
        use rand::prelude::*;

        let key: [u8; 32] = rng.random();
        let iv: [u8; 16] = rng.random();
        let ciphertext = apply_keystream(value.to_le_bytes(), &key, &iv);
        Self {
            ciphertext,
            key,
            iv,
        }
    }

    pub fn open(&self) -> Number {
        Number::from_le_bytes(apply_keystream(self.ciphertext, &self.key, &self.iv))
    }
}

// keep the plaintext out of debug output too
impl core::fmt::Debug for SealedSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SealedSecret").finish_non_exhaustive()
    }
}

fn apply_keystream(
    mut block: [u8; CIPHERTEXT_LEN],
    key: &[u8; 32],
    iv: &[u8; 16],
) -> [u8; CIPHERTEXT_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(key);
    hasher.update(iv);
    let keystream = hasher.finalize();

    for (byte, pad) in block.iter_mut().zip(keystream.iter()) {
        *byte ^= pad;
    }
    block
}

mod base64_bytes {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(text).map_err(D::Error::custom)?;
        bytes
            .try_into()
            .map_err(|bytes: Vec<u8>| D::Error::invalid_length(bytes.len(), &"fixed-width field"))
    }
}
