//! Spelled-out amounts for the three contract languages.
//!
//! Whole numbers only: contracts print the tenge part in words and the
//! figure in digits. Russian agrees the thousands scale in gender and
//! number (`одна тысяча`, `две тысячи`, `пять тысяч`); Kazakh and English
//! have no agreement.

use crate::Lang;

const RU_UNITS_M: [&str; 10] = [
    "", "один", "два", "три", "четыре", "пять", "шесть", "семь", "восемь", "девять",
];
const RU_UNITS_F: [&str; 10] = [
    "", "одна", "две", "три", "четыре", "пять", "шесть", "семь", "восемь", "девять",
];
const RU_TEENS: [&str; 10] = [
    "десять",
    "одиннадцать",
    "двенадцать",
    "тринадцать",
    "четырнадцать",
    "пятнадцать",
    "шестнадцать",
    "семнадцать",
    "восемнадцать",
    "девятнадцать",
];
const RU_TENS: [&str; 10] = [
    "", "", "двадцать", "тридцать", "сорок", "пятьдесят", "шестьдесят", "семьдесят",
    "восемьдесят", "девяносто",
];
const RU_HUNDREDS: [&str; 10] = [
    "", "сто", "двести", "триста", "четыреста", "пятьсот", "шестьсот", "семьсот", "восемьсот",
    "девятьсот",
];

/// Russian scale words as `(one, few, many, feminine)`.
const RU_SCALES: [(&str, &str, &str, bool); 4] = [
    ("", "", "", false),
    ("тысяча", "тысячи", "тысяч", true),
    ("миллион", "миллиона", "миллионов", false),
    ("миллиард", "миллиарда", "миллиардов", false),
];

const KK_UNITS: [&str; 10] = [
    "", "бір", "екі", "үш", "төрт", "бес", "алты", "жеті", "сегіз", "тоғыз",
];
const KK_TENS: [&str; 10] = [
    "", "он", "жиырма", "отыз", "қырық", "елу", "алпыс", "жетпіс", "сексен", "тоқсан",
];
const KK_SCALES: [&str; 4] = ["", "мың", "миллион", "миллиард"];

const EN_UNITS: [&str; 20] = [
    "", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen", "nineteen",
];
const EN_TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];
const EN_SCALES: [&str; 4] = ["", "thousand", "million", "billion"];

/// Spell `n` out in `lang`.
pub fn spell(n: i64, lang: Lang) -> String {
    if n == 0 {
        return zero(lang).to_string();
    }
    let magnitude = n.unsigned_abs();
    let body = match lang {
        Lang::Russian => spell_ru(magnitude),
        Lang::Kazakh => spell_kk(magnitude),
        Lang::English => spell_en(magnitude),
    };
    if n < 0 {
        format!("{} {body}", minus(lang))
    } else {
        body
    }
}

/// The word for zero.
pub fn zero(lang: Lang) -> &'static str {
    match lang {
        Lang::Russian => "ноль",
        Lang::Kazakh => "нөл",
        Lang::English => "zero",
    }
}

fn minus(lang: Lang) -> &'static str {
    match lang {
        Lang::Russian | Lang::Kazakh => "минус",
        Lang::English => "minus",
    }
}

/// Split into base-1000 groups, least significant first. Anything above the
/// billions is folded into the top group.
fn groups(mut n: u64) -> [u64; 4] {
    let mut out = [0u64; 4];
    for slot in out.iter_mut().take(3) {
        *slot = n % 1000;
        n /= 1000;
    }
    out[3] = n;
    out
}

fn spell_ru(n: u64) -> String {
    let mut words: Vec<String> = Vec::new();
    for (scale, group) in groups(n).iter().enumerate().rev() {
        if *group == 0 {
            continue;
        }
        let (one, few, many, feminine) = RU_SCALES[scale];
        if *group >= 1000 {
            // Only reachable for the top group.
            words.push(spell_ru(*group));
        } else {
            push_ru_triplet(&mut words, *group as usize, feminine);
        }
        if scale > 0 {
            words.push(ru_plural(*group, one, few, many).to_string());
        }
    }
    words.join(" ")
}

fn push_ru_triplet(words: &mut Vec<String>, n: usize, feminine: bool) {
    let hundreds = n / 100;
    let rest = n % 100;
    if hundreds > 0 {
        words.push(RU_HUNDREDS[hundreds].to_string());
    }
    if (10..20).contains(&rest) {
        words.push(RU_TEENS[rest - 10].to_string());
        return;
    }
    if rest >= 20 {
        words.push(RU_TENS[rest / 10].to_string());
    }
    let unit = rest % 10;
    if unit > 0 {
        let table = if feminine { &RU_UNITS_F } else { &RU_UNITS_M };
        words.push(table[unit].to_string());
    }
}

fn ru_plural<'a>(n: u64, one: &'a str, few: &'a str, many: &'a str) -> &'a str {
    let last_two = n % 100;
    let last = n % 10;
    if (11..=14).contains(&last_two) {
        many
    } else if last == 1 {
        one
    } else if (2..=4).contains(&last) {
        few
    } else {
        many
    }
}

fn spell_kk(n: u64) -> String {
    let mut words: Vec<String> = Vec::new();
    for (scale, group) in groups(n).iter().enumerate().rev() {
        if *group == 0 {
            continue;
        }
        if *group >= 1000 {
            words.push(spell_kk(*group));
        } else {
            push_kk_triplet(&mut words, *group as usize);
        }
        if scale > 0 {
            words.push(KK_SCALES[scale].to_string());
        }
    }
    words.join(" ")
}

fn push_kk_triplet(words: &mut Vec<String>, n: usize) {
    let hundreds = n / 100;
    let tens = (n % 100) / 10;
    let unit = n % 10;
    if hundreds > 0 {
        if hundreds > 1 {
            words.push(KK_UNITS[hundreds].to_string());
        }
        words.push("жүз".to_string());
    }
    if tens > 0 {
        words.push(KK_TENS[tens].to_string());
    }
    if unit > 0 {
        words.push(KK_UNITS[unit].to_string());
    }
}

fn spell_en(n: u64) -> String {
    let mut words: Vec<String> = Vec::new();
    for (scale, group) in groups(n).iter().enumerate().rev() {
        if *group == 0 {
            continue;
        }
        if *group >= 1000 {
            words.push(spell_en(*group));
        } else {
            words.push(en_triplet(*group as usize));
        }
        if scale > 0 {
            words.push(EN_SCALES[scale].to_string());
        }
    }
    words.join(" ")
}

fn en_triplet(n: usize) -> String {
    let hundreds = n / 100;
    let rest = n % 100;
    let tail = if rest < 20 {
        EN_UNITS[rest].to_string()
    } else if rest % 10 == 0 {
        EN_TENS[rest / 10].to_string()
    } else {
        format!("{}-{}", EN_TENS[rest / 10], EN_UNITS[rest % 10])
    };
    match (hundreds, rest) {
        (0, _) => tail,
        (h, 0) => format!("{} hundred", EN_UNITS[h]),
        (h, _) => format!("{} hundred and {tail}", EN_UNITS[h]),
    }
}
