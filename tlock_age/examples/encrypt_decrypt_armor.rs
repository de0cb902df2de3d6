use std::time::Duration;

use tlock_age::FixedNetwork;

fn main() {
    let msg = b"Hello world! I'm encrypting a message using timelock encryption.".to_vec();

    let chain_hash = "7672797f548f3f4748ac4bf3352fc6c6b6468c9ad40ad456a397545c6e2df5bf";
    let pk_bytes = hex::decode("8200fc249deb0148eb918d6e213980c5d01acd7fc251900d9260136da3b54836ce125172399ddc69c4e3e11429b62c11").unwrap();
    let signature = hex::decode("a4721e6c3eafcd823f138cd29c6c82e8c5149101d0bb4bafddbac1c2d1fe3738895e4e21dd4b8b41bf007046440220910bb1cdb91f50a84a0d7f33ff2e8577aa62ac64b35a291a728a9db5ac91e06d1312b48a376138d77b4d6ad27c24221afe").unwrap();
    let round = 1000;

    let network = FixedNetwork::new(
        chain_hash,
        pk_bytes.clone(),
        tlock::PEDERSEN_BLS_UNCHAINED,
        0,
        Duration::from_secs(3),
    );

    // Armoring makes the encrypted message ASCII-printable; decrypt
    // autodetects it, so no flag is needed on the other side.
    let mut encrypted = vec![];
    tlock_age::encrypt(network, round, msg.as_slice(), &mut encrypted, true).unwrap();

    let network = FixedNetwork::new(
        chain_hash,
        pk_bytes,
        tlock::PEDERSEN_BLS_UNCHAINED,
        0,
        Duration::from_secs(3),
    )
    .with_signature(round, signature);

    let mut decrypted = vec![];
    tlock_age::decrypt(network, false, encrypted.as_slice(), &mut decrypted).unwrap();
    let decrypted = std::str::from_utf8(&decrypted).unwrap();

    println!("{decrypted}");
}
