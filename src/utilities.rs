use nanoid::nanoid;

const NANOID_ALPHABET: &[char] = &[
    '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'A', 'b', 'B', 'c', 'C', 'd', 'D', 'e',
    'E', 'f', 'F', 'g', 'G', 'h', 'H', 'i', 'I', 'j', 'J', 'k', 'K', 'l', 'L', 'm', 'M', 'n', 'N',
    'o', 'O', 'p', 'P', 'q', 'Q', 'r', 'R', 's', 'S', 't', 'T', 'u', 'U', 'v', 'V', 'w', 'W', 'x',
    'X', 'y', 'Y', 'z', 'Z',
];

pub fn friendly_id(len: usize) -> String {
    nanoid!(len, &NANOID_ALPHABET)
}

/// One-way digest sent instead of the plaintext passphrase. Always 64 lowercase hex chars.
pub fn hash_passphrase(passphrase: &str) -> String {
    sha256::digest(passphrase)
}
