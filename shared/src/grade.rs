//! 成绩换算：百分制 → 字母等级，字母等级 → 绩点，学分加权 GPA

use crate::GradeRecord;

/// (字母等级, 绩点)
pub const GRADE_SCALE: [(&str, f64); 12] = [
    ("A+", 4.0),
    ("A", 4.0),
    ("A-", 3.7),
    ("B+", 3.3),
    ("B", 3.0),
    ("B-", 2.7),
    ("C+", 2.3),
    ("C", 2.0),
    ("C-", 1.7),
    ("D+", 1.3),
    ("D", 1.0),
    ("F", 0.0),
];

/// (最低百分比, 字母等级)，按阈值降序排列
const LETTER_THRESHOLDS: [(f64, &str); 11] = [
    (97.0, "A+"),
    (93.0, "A"),
    (90.0, "A-"),
    (87.0, "B+"),
    (83.0, "B"),
    (80.0, "B-"),
    (77.0, "C+"),
    (73.0, "C"),
    (70.0, "C-"),
    (67.0, "D+"),
    (60.0, "D"),
];

pub fn letter_grade(percentage: f64) -> &'static str {
    LETTER_THRESHOLDS
        .iter()
        .find(|(min, _)| percentage >= *min)
        .map(|(_, letter)| *letter)
        .unwrap_or("F")
}

/// 成绩记录展示用的字母等级
///
/// 依次使用后端给出的字母等级、最终成绩，都没有时按百分比换算。
pub fn record_letter(record: &GradeRecord) -> Option<&str> {
    record
        .letter_grade
        .as_deref()
        .or(record.final_grade.as_deref())
        .or_else(|| record.percentage.map(letter_grade))
}

/// 未知等级返回 None
pub fn grade_points(letter: &str) -> Option<f64> {
    let letter = letter.trim();
    GRADE_SCALE
        .iter()
        .find(|(l, _)| *l == letter)
        .map(|(_, points)| *points)
}

/// 学分加权平均绩点，保留两位小数
///
/// 只统计同时具有字母等级和学分的记录；未知等级按 0 分计入。
/// 没有可统计的记录时返回 0。
pub fn gpa(records: &[GradeRecord]) -> f64 {
    let (points, credits) = records
        .iter()
        .filter_map(|r| {
            let letter = r.letter_grade.as_deref().or(r.final_grade.as_deref())?;
            let credits = r.credits.filter(|c| *c > 0)?;
            Some((grade_points(letter).unwrap_or(0.0), f64::from(credits)))
        })
        .fold((0.0, 0.0), |(p, c), (gp, cr)| (p + gp * cr, c + cr));

    if credits > 0.0 {
        (points / credits * 100.0).round() / 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(letter: Option<&str>, credits: Option<u32>) -> GradeRecord {
        GradeRecord {
            letter_grade: letter.map(str::to_string),
            credits,
            ..Default::default()
        }
    }

    #[test]
    fn letter_grade_boundaries() {
        assert_eq!(letter_grade(100.0), "A+");
        assert_eq!(letter_grade(97.0), "A+");
        assert_eq!(letter_grade(96.9), "A");
        assert_eq!(letter_grade(80.0), "B-");
        assert_eq!(letter_grade(60.0), "D");
        assert_eq!(letter_grade(59.99), "F");
    }

    #[test]
    fn record_letter_falls_back_to_percentage() {
        let graded = GradeRecord {
            letter_grade: Some("B+".to_string()),
            percentage: Some(95.0),
            ..Default::default()
        };
        assert_eq!(record_letter(&graded), Some("B+"));

        let in_progress = GradeRecord {
            percentage: Some(84.5),
            ..Default::default()
        };
        assert_eq!(record_letter(&in_progress), Some("B"));

        assert_eq!(record_letter(&GradeRecord::default()), None);
    }

    #[test]
    fn gpa_is_credit_weighted() {
        let records = [record(Some("A"), Some(3)), record(Some("B"), Some(3))];
        assert_eq!(gpa(&records), 3.5);

        let records = [record(Some("A"), Some(4)), record(Some("C"), Some(2))];
        assert_eq!(gpa(&records), 3.33);
    }

    #[test]
    fn gpa_ignores_incomplete_records() {
        assert_eq!(gpa(&[]), 0.0);
        let records = [record(None, Some(3)), record(Some("A"), None)];
        assert_eq!(gpa(&records), 0.0);
    }

    #[test]
    fn final_grade_is_used_when_letter_grade_missing() {
        let records = [GradeRecord {
            final_grade: Some("B+".to_string()),
            credits: Some(3),
            ..Default::default()
        }];
        assert_eq!(gpa(&records), 3.3);
    }
}
