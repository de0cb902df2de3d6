//! Round-trip example using fastnet's (`bls-unchained-on-g1`) published
//! public key and a beacon signature fetched ahead of time. See `tlock_age`'s
//! examples for a version that fetches the beacon live over HTTP.

fn main() {
    // curl -sS https://api.drand.sh/dbd506d6ef76e5f386f41c651dcb808c5bcbd75471cc4eafa3f4df7ad4e4c493/info | jq -r '.public_key'
    let pk_bytes = hex::decode("a0b862a7527fee3a731bcb59280ab6abd62d5c0b6ea03dc4ddf6612fdfc9d01f01c31542541771903475eb1ec6615f8d0df0b8b6dce385811d6dcf8cbefb8759e5e616a3dfd054c928940766d9a5b9db91e3b697e5d70a975181e007f87fca5e").unwrap();
    let scheme = tlock::BLS_UNCHAINED_ON_G1;
    let round = 1000;

    let msg = vec![8u8; 16];
    let mut encrypted = vec![];
    tlock::encrypt(&mut encrypted, msg.as_slice(), &scheme, &pk_bytes, round).unwrap();

    // curl -sS https://api.drand.sh/dbd506d6ef76e5f386f41c651dcb808c5bcbd75471cc4eafa3f4df7ad4e4c493/public/1000 | jq -r '.signature'
    let signature = hex::decode("b09eacd45767c4d58306b98901ad0d6086e2663766f3a4ec71d00cf26f0f49eaf248abc7151c60cf419c4e8b37e80412").unwrap();
    let beacon = tlock::Beacon::new(round, signature);

    let mut decrypted = vec![];
    tlock::decrypt(&mut decrypted, encrypted.as_slice(), &scheme, &pk_bytes, &beacon).unwrap();

    assert_eq!(msg, decrypted);
    println!("Encryption and decryption were successful");
}
