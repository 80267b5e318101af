//! # NTRU KEM Module
//!
//! Post-quantum one-shot key encapsulation for the multi-key identity
//! layer, using NTRU-HPS-2048-509 via the PQClean reference implementation.
//!
//! ## Components
//!
//! - [`NtruKem`]: key generation, encapsulation, decapsulation
//!
//! ## Key Sizes (pqcrypto-ntru / PQClean, NTRU-HPS-2048-509)
//!
//! | Parameter     | Size (bytes) |
//! |---------------|--------------|
//! | Public key    | 699          |
//! | Secret key    | 935          |
//! | Ciphertext    | 699          |
//! | Shared secret | 32           |
//!
//! This parameter set is NIST security category 1 (128-bit), matching the
//! security level the rest of the crate draws its DRBGs at.
//!
//! ## Example
//!
//! ```
//! use gmk_core::crypto::kem::NtruKem;
//!
//! let kp = NtruKem::generate().unwrap();
//! let (ct, ss1) = NtruKem::encapsulate(&kp.public).unwrap();
//! let ss2 = NtruKem::decapsulate(kp.secret.expose(), &ct).unwrap();
//! assert_eq!(ss1, ss2);
//! ```

mod ntru;

pub use ntru::NtruKem;
pub use ntru::{CIPHERTEXT_SIZE, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE, SHARED_SECRET_SIZE};
