use criterion::{criterion_group, criterion_main, Criterion};
use evalcore::books::extract_books;
use evalcore::record::parse_survey;

const CELL: &str = "1. <데미안> / 헤르만 헤세 / 민음사 / 2000\n\
2. 《코스모스》 / 칼 세이건 / 사이언스북스 / 2006\n\
3. 제목: 사피엔스 저자: 유발 하라리\n\
4. \"정의란 무엇인가\" / 마이클 샌델 / 와이즈베리 / $2014";

fn bench_extract(c: &mut Criterion) {
    c.bench_function("extract_books", |b| b.iter(|| extract_books(CELL)));
}

fn bench_parse_survey(c: &mut Criterion) {
    let row = format!(
        "2024-01-01,Kim,1,query one,\"{}\",query two,,query three,,📚 전공/심화 학습형,,🎨 문학/콘텐츠 추천형",
        CELL.replace('"', "\"\"")
    );
    let csv = std::iter::once("header".to_string()).chain(std::iter::repeat(row).take(100)).collect::<Vec<_>>().join("\n");
    c.bench_function("parse_survey_100_rows", |b| b.iter(|| parse_survey(&csv)));
}

criterion_group!(benches, bench_extract, bench_parse_survey);
criterion_main!(benches);
