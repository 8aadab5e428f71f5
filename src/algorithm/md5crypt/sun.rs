//! Sun's MD5 crypt (`$md5$`), as shipped with Solaris.
//!
//! Every round picks two bits out of the running digest and, depending on
//! their XOR, mixes in a fixed passage of text before the round counter.

use md5::{Digest as _, Md5};

use crate::encoding::crypt64::encode64;

const BASE_ROUNDS: u64 = 4096;

const MAGIC_HAMLET: &[u8] = b"To be, or not to be,--that is the question:--\n\
Whether 'tis nobler in the mind to suffer\n\
The slings and arrows of outrageous fortune\n\
Or to take arms against a sea of troubles,\n\
And by opposing end them?--To die,--to sleep,--\n\
No more; and by a sleep to say we end\n\
The heartache, and the thousand natural shocks\n\
That flesh is heir to,--'tis a consummation\n\
Devoutly to be wish'd. To die,--to sleep;--\n\
To sleep! perchance to dream:--ay, there's the rub;\n\
For in that sleep of death what dreams may come,\n\
When we have shuffled off this mortal coil,\n\
Must give us pause: there's the respect\n\
That makes calamity of so long life;\n\
For who would bear the whips and scorns of time,\n\
The oppressor's wrong, the proud man's contumely,\n\
The pangs of despis'd love, the law's delay,\n\
The insolence of office, and the spurns\n\
That patient merit of the unworthy takes,\n\
When he himself might his quietus make\n\
With a bare bodkin? who would these fardels bear,\n\
To grunt and sweat under a weary life,\n\
But that the dread of something after death,--\n\
The undiscover'd country, from whose bourn\n\
No traveller returns,--puzzles the will,\n\
And makes us rather bear those ills we have\n\
Than fly to others that we know not of?\n\
Thus conscience does make cowards of us all;\n\
And thus the native hue of resolution\n\
Is sicklied o'er with the pale cast of thought;\n\
And enterprises of great pith and moment,\n\
With this regard, their currents turn awry,\n\
And lose the name of action.--Soft you now!\n\
The fair Ophelia!--Nymph, in thy orisons\n\
Be all my sins remember'd.\n\0";

// output byte order, three bytes per crypt64 group
const TRANSPOSE: [usize; 16] = [12, 6, 0, 13, 7, 1, 14, 8, 2, 15, 9, 3, 5, 10, 4, 11];

/// Derives the 22 character key.
///
/// `rounds` are added on top of the fixed 4096; zero writes the config
/// without a rounds field.
pub(super) fn key(password: &[u8], salt: &[u8], rounds: u32) -> String {
    let header = if rounds > 0 {
        format!("$md5,rounds={rounds}$")
    } else {
        "$md5$".to_string()
    };

    let mut hasher = Md5::new();
    hasher.update(password);
    hasher.update(header.as_bytes());
    hasher.update(salt);
    hasher.update(b"$");

    let mut digest = [0u8; 16];
    digest.copy_from_slice(&hasher.finalize());

    for round in 0..BASE_ROUNDS + u64::from(rounds) {
        let x = pick(&digest, round, |i, shift| (i + shift, i + 3 + shift));
        let y = pick(&digest, round + 64, |i, shift| {
            ((i + 8 + shift) & 15, (i + 11 + shift) & 15)
        });

        let coin = bit(&digest, x) ^ bit(&digest, y);

        let mut hasher = Md5::new();
        hasher.update(digest);
        if coin == 1 {
            hasher.update(MAGIC_HAMLET);
        }
        hasher.update(round.to_string().as_bytes());
        digest.copy_from_slice(&hasher.finalize());
    }

    let transposed: Vec<u8> = TRANSPOSE.iter().map(|&i| digest[i]).collect();

    encode64(&transposed)
}

/// Bit `n` of the digest, wrapping at 128.
fn bit(digest: &[u8; 16], n: u64) -> u8 {
    let n = (n % 128) as usize;
    (digest[n >> 3] >> (n & 7)) & 1
}

/// Builds an 8 bit index out of indirectly addressed digest bits.
fn pick(digest: &[u8; 16], selector: u64, index: impl Fn(usize, usize) -> (usize, usize)) -> u64 {
    let shift = usize::from(bit(digest, selector));

    (0..8).fold(0u64, |acc, i| {
        let (ia, ib) = index(i, shift);
        let a = digest[ia];
        let b = digest[ib];

        let v = digest[usize::from((a >> (b % 5)) & 15)] >> ((b >> (a & 7)) & 1);

        acc | (u64::from(bit(digest, u64::from(v))) << i)
    })
}
