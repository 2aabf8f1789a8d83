//! Internet checksum (RFC 1071)

/// Calculate the one's-complement Internet checksum of `data`.
///
/// Words are read in network order. A trailing odd byte is padded with a
/// zero octet, so it becomes the first byte of a final 16-bit word.
pub fn internet_checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;

    let mut words = data.chunks_exact(2);
    for word in &mut words {
        sum = sum.wrapping_add(u16::from_be_bytes([word[0], word[1]]) as u32);
    }
    if let [last] = words.remainder() {
        sum = sum.wrapping_add(u16::from_be_bytes([*last, 0]) as u32);
    }

    while sum >> 16 != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    !(sum as u16)
}

/// Returns true when `data` already carries a valid checksum.
pub fn verify_checksum(data: &[u8]) -> bool {
    internet_checksum(data) == 0
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_checksum_self_verifies(mut data in proptest::collection::vec(any::<u8>(), 4..256)) {
            data[2] = 0;
            data[3] = 0;
            let checksum = internet_checksum(&data);
            data[2..4].copy_from_slice(&checksum.to_be_bytes());
            prop_assert!(verify_checksum(&data));
        }

        #[test]
        fn test_checksum_ignores_zero_words(data in proptest::collection::vec(any::<u8>(), 0..128)) {
            let mut even = data.clone();
            if even.len() % 2 == 1 {
                even.push(0);
            }
            let mut extended = even.clone();
            extended.extend_from_slice(&[0, 0]);
            prop_assert_eq!(internet_checksum(&even), internet_checksum(&extended));
        }
    }
}
