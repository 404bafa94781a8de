use crate::hash::Hash;
use cryptoxide::blake2b::Blake2b;
use thiserror::Error;
use vesta_codec::minicbor;

/// Incremental Blake2b hasher of a given `BITS` output size.
///
/// Cardano uses 256 for content ids (transactions, datums, blocks) and 224
/// for key and script hashes.
///
/// ```
/// # use vesta_crypto::hash::Hasher;
/// let mut hasher = Hasher::<256>::new();
/// hasher.input(b"My transaction");
///
/// let digest = hasher.finalize();
/// # assert_eq!(
/// #   "0d8d00cdd4657ac84d82f0a56067634a7adfdf43da41cb534bcaa45060973d21",
/// #   hex::encode(digest)
/// # );
/// ```
pub struct Hasher<const BITS: usize>(Blake2b);

impl<const BITS: usize> Hasher<BITS> {
    /// update the [`Hasher`] with the given input
    #[inline]
    pub fn input(&mut self, bytes: &[u8]) {
        use cryptoxide::digest::Digest as _;
        self.0.input(bytes);
    }
}

macro_rules! common_hasher {
    ($size:literal) => {
        impl Hasher<$size> {
            #[inline]
            pub fn new() -> Self {
                Self(Blake2b::new($size / 8))
            }

            /// one-shot digest of the given bytes
            #[inline]
            pub fn hash(bytes: &[u8]) -> Hash<{ $size / 8 }> {
                let mut hasher = Self::new();
                hasher.input(bytes);
                hasher.finalize()
            }

            /// digest of a single prefix byte followed by the given bytes,
            /// the scheme used for script hashes
            #[inline]
            pub fn hash_tagged(bytes: &[u8], tag: u8) -> Hash<{ $size / 8 }> {
                let mut hasher = Self::new();
                hasher.input(&[tag]);
                hasher.input(bytes);
                hasher.finalize()
            }

            /// digest of the CBOR encoding of the given value
            #[inline]
            pub fn hash_cbor(data: &impl minicbor::Encode<()>) -> Hash<{ $size / 8 }> {
                let mut hasher = Self::new();
                let () = minicbor::encode(data, &mut hasher).expect("infallible");
                hasher.finalize()
            }

            /// consume the [`Hasher`] and return the computed digest
            pub fn finalize(mut self) -> Hash<{ $size / 8 }> {
                use cryptoxide::digest::Digest as _;
                let mut hash = [0; $size / 8];
                self.0.result(&mut hash);
                Hash::new(hash)
            }
        }

        impl Default for Hasher<$size> {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

common_hasher!(224);
common_hasher!(256);

impl<'a, const BITS: usize> minicbor::encode::Write for &'a mut Hasher<BITS> {
    type Error = std::convert::Infallible;

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.input(buf);
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("blake2b digest size {0} outside the 1..=64 range")]
pub struct DigestSizeError(pub usize);

/// One-shot Blake2b digest with a caller-chosen output size in bytes.
///
/// 28 and 32 have dedicated [`Hasher`] instantiations; anything inside
/// Blake2b's native 1..=64 range is accepted here.
pub fn hash_to_size(bytes: &[u8], digest_size: usize) -> Result<Vec<u8>, DigestSizeError> {
    use cryptoxide::digest::Digest as _;

    if digest_size == 0 || digest_size > 64 {
        return Err(DigestSizeError(digest_size));
    }

    let mut ctx = Blake2b::new(digest_size);
    ctx.input(bytes);

    let mut out = vec![0; digest_size];
    ctx.result(&mut out);

    Ok(out)
}
