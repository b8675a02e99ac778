//! Round-trip coverage: every accepted statement must print to a canonical
//! form that is a fixed point of parse → print.

use omnisql::{parse, to_sql};

/// Parse, print, re-parse, print again; the two printings must agree, and
/// a third cycle must agree with the second.
fn roundtrip(sql: &str) -> String {
    let stmt = parse(sql)
        .unwrap_or_else(|e| panic!("parse error for `{sql}`: {e}"))
        .unwrap_or_else(|| panic!("no statement in `{sql}`"));
    let t1 = to_sql(&stmt);

    let stmt2 = parse(&t1)
        .unwrap_or_else(|e| panic!("re-parse error for `{t1}` (from `{sql}`): {e}"))
        .unwrap_or_else(|| panic!("re-parse lost the statement for `{t1}`"));
    let t2 = to_sql(&stmt2);
    assert_eq!(t1, t2, "round-trip diverged for `{sql}`");

    let stmt3 = parse(&t2)
        .unwrap_or_else(|e| panic!("third parse error for `{t2}`: {e}"))
        .unwrap_or_else(|| panic!("third parse lost the statement for `{t2}`"));
    let t3 = to_sql(&stmt3);
    assert_eq!(t2, t3, "second iteration diverged for `{sql}`");

    t1
}

#[test]
fn canonical_scenarios() {
    let cases = [
        ("select 1 from t", "SELECT 1 FROM t"),
        ("select a.b.c.d from a.b.c", "SELECT a.b.c.d FROM a.b.c"),
        (
            "insert into t (a,b) values (1,2),(3,4)",
            "INSERT INTO t (a, b) VALUES (1, 2), (3, 4)",
        ),
        (
            "select * from t where a like '%x%' escape '#'",
            "SELECT * FROM t WHERE a LIKE '%x%' ESCAPE '#'",
        ),
        ("select array[1,2,3]", "SELECT ARRAY[ 1, 2, 3 ]"),
        ("select [col name] from [t]", "SELECT \"col name\" FROM t"),
        (
            "with cte as (select 1) select * from cte",
            "WITH cte AS (SELECT 1) SELECT * FROM cte",
        ),
        (
            "select row_number() over (partition by a order by b) from t",
            "SELECT row_number() OVER (PARTITION BY a ORDER BY b) FROM t",
        ),
    ];
    for (input, expected) in cases {
        assert_eq!(roundtrip(input), expected, "input: {input}");
    }
}

#[test]
fn select_inventory() {
    let queries = [
        "select 1 from t",
        "select 1, 2 from t",
        "select * from t",
        "select a.* from t",
        "select a.b.* from t",
        "select distinct 1 from t",
        "select a as b from t",
        "select a b from t",
        "select * from t where a = 1",
        "select * from t where a = 1 and b = 2",
        "select * from t where a = 1 or b = 2",
        "select * from t where a in (1, 2, 3)",
        "select * from t where a not in (1, 2, 3)",
        "select * from t where a between 1 and 10",
        "select * from t where a not between 1 and 10",
        "select * from t where a like '%test%'",
        "select * from t where a not like '%test%'",
        "select * from t where a ilike '%test%'",
        "select * from t where a is null",
        "select * from t where a is not null",
        "select * from t where a is unknown",
        "select * from t where not a = 1",
        "select a, count(*) from t group by a",
        "select a, b, count(*) from t group by a, b",
        "select a, count(*) from t group by a having count(*) > 5",
        "select * from t order by a",
        "select * from t order by a desc",
        "select * from t order by a, b desc",
        "select * from t order by a asc nulls first",
        "select * from t limit 10",
        "select * from t limit 10 offset 20",
        "select * from t limit 20, 10",
        "select * from t offset 20",
        "select * from t fetch first 5 rows only",
        "select * from t for update",
        "select * from t for share nowait",
        "select * from t for update skip locked",
        "select sql_calc_found_rows a from t",
        "select all a from t",
    ];
    for q in queries {
        roundtrip(q);
    }
}

#[test]
fn join_inventory() {
    let queries = [
        "select * from t1 join t2 on t1.id = t2.id",
        "select * from t1 inner join t2 on t1.id = t2.id",
        "select * from t1 left join t2 on t1.id = t2.id",
        "select * from t1 left outer join t2 on t1.id = t2.id",
        "select * from t1 right join t2 on t1.id = t2.id",
        "select * from t1 full join t2 on t1.id = t2.id",
        "select * from t1 cross join t2",
        "select * from t1 natural join t2",
        "select * from t1 natural left join t2",
        "select * from t1 straight_join t2 on a = b",
        "select * from t1 join t2 on a = b join t3 on c = d",
        "select * from t1 join t2 using (id)",
        "select * from t1 join t2 using (id, name)",
        "select 1 from t1, t2",
        "select * from (select 1 from t) as sub",
        "select * from (select 1, 2 from t) as sub (a, b)",
        "select * from ((t1 join t2 on a = b))",
        "select * from t1 join (select * from t2 union select * from t3) as t on t1.id = t.id",
        "select * from t use index (i1)",
        "select * from t use index for join (i1, i2)",
        "select * from t force index (i1) ignore key for group by (i2)",
        "select * from (values (1, 2), (3, 4)) as v (a, b)",
        "select * from t as x",
        "select * from a.b.c as x",
        "select * from a join lateral (select 1 from t) as x on 1 = 1",
        "select * from a cross join lateral (select b from t) as x",
    ];
    for q in queries {
        roundtrip(q);
    }
}

#[test]
fn set_op_inventory() {
    let queries = [
        "select 1 from t union select 2 from t",
        "select 1 from t union all select 2 from t",
        "select 1 from t union select 2 from t union select 3 from t",
        "select 1 from t union all select 2 from t union select 3 from t",
        "select 1 from t intersect select 2 from t",
        "select 1 from t except select 2 from t",
        "select 1 from t union select 2 from t order by 1",
        "select 1 from t union select 2 from t limit 10",
        "(select 1 from t) union (select 2 from t)",
        "(select 1 from t) union (select 2 from t) order by 1 limit 5",
        "select * from t where id in (select 1 from a union select 2 from b)",
    ];
    for q in queries {
        roundtrip(q);
    }
}

#[test]
fn cte_inventory() {
    let queries = [
        "with cte as (select 1 from t) select * from cte",
        "with cte (a, b) as (select 1, 2 from t) select * from cte",
        "with c1 as (select 1 from t), c2 as (select 2 from t) select * from c1, c2",
        "with recursive cte (id, n) as (select 1, 1 from t union all \
         select id + 1, n + 2 from cte where id < 5) select * from cte",
        "with active as (select id from users where status = 'active') \
         select * from active",
        "with cte as (select 1) insert into t (a) select * from cte",
        "with cte as (select 1) update t set a = 2 where id in (select * from cte)",
        "with cte as (select 1) delete from t where id in (select * from cte)",
        "with cte as (values (1), (2)) select * from cte",
    ];
    for q in queries {
        roundtrip(q);
    }
}

#[test]
fn expression_inventory() {
    let queries = [
        "select a + b from t",
        "select a - b from t",
        "select a * b from t",
        "select a / b from t",
        "select a % b from t",
        "select -a from t",
        "select - -1 from t",
        "select ~a from t",
        "select (a + b) * c / d from t",
        "select a || ' ' || b from t",
        "select a & b | c ^ d from t",
        "select a << 2 >> 1 from t",
        "select a = b, a <> b, a < b, a > b, a <= b, a >= b from t",
        "select a xor b from t",
        "select case when a = 1 then 'one' end from t",
        "select case when a = 1 then 'one' else 'other' end from t",
        "select case a when 1 then 'one' when 2 then 'two' end from t",
        "select cast(a as int) from t",
        "select cast(a as varchar(255)) from t",
        "select cast(a as decimal(10, 2)) from t",
        "select cast(a as double precision) from t",
        "select cast(a as int[]) from t",
        "select a::int from t",
        "select count(*) from t",
        "select count(a) from t",
        "select count(distinct a) from t",
        "select coalesce(a, b, c) from t",
        "select nullif(a, b) from t",
        "select sum(a) filter (where a > 0) from t",
        "select extract(year from created_at) from t",
        "select extract(epoch from ts) from t",
        "select interval 1 day from t",
        "select interval '1 hour' from t",
        "select trim(both ' ' from a) from t",
        "select trim(leading from a) from t",
        "select trim(a) from t",
        "select substring(a from 1 for 2) from t",
        "select substring(a, 1, 2) from t",
        "select position('x' in a) from t",
        "select array[ 1, 2 ] from t",
        "select arr[ 1 ] from t",
        "select matrix[ 1 ][ 2 ] from t",
        "select a collate nocase from t",
        "select exists (select 1 from t)",
        "select (select max(a) from t) from u",
        "select x'cafe' from t",
        "select 0xFF from t",
        "select 1.5e+10, .5, 5. from t",
        "select 'it''s', $$tag free$$ from t",
        "select ?, $1, :name, @v from t",
        "select \"quoted col\", `tick`, [brack] from t",
        "select a is not false from t",
        "select a not between 1 and 2 and b from t",
        "select a similar to 'x%' from t",
        "select default from t",
    ];
    for q in queries {
        roundtrip(q);
    }
}

#[test]
fn window_inventory() {
    let queries = [
        "select row_number() over () from t",
        "select row_number() over (partition by a) from t",
        "select row_number() over (order by b desc) from t",
        "select row_number() over (partition by a order by b) from t",
        "select rank() over w from t window w as (order by a)",
        "select sum(a) over (rows unbounded preceding) from t",
        "select sum(a) over (rows between 2 preceding and current row) from t",
        "select sum(a) over (range between unbounded preceding and unbounded following) from t",
        "select sum(a) over (groups between 1 preceding and 1 following) from t",
        "select sum(a) over (w order by b) from t window w as (partition by c)",
    ];
    for q in queries {
        roundtrip(q);
    }
}

#[test]
fn dml_inventory() {
    let queries = [
        "insert into t (a, b) values (1, 'x')",
        "insert into t values (1, 2)",
        "insert into t (a) values (default), (1)",
        "insert into t default values",
        "insert into t select a from s",
        "insert into t (a) select a from s where a > 0",
        "insert ignore into t (a) values (1)",
        "replace into t (a) values (1)",
        "insert into t set a = 1, b = 'x'",
        "insert into t (a) values (1) on duplicate key update a = 2",
        "insert into t (a) values (1) on conflict do nothing",
        "insert into t (a) values (1) on conflict (a) do update set a = 2",
        "insert into t (a) values (1) on conflict (a) where a > 0 do update set a = 2",
        "insert into t (a) values (1) returning id, a",
        "update t set a = 1",
        "update t set a = 1, b = 2 where id = 3",
        "update t set a = u.a from u where t.id = u.id",
        "update t set a = 1 order by id limit 10",
        "update t set a = 1 returning a",
        "update t as x set x.a = 1",
        "delete from t",
        "delete from t where id = 1",
        "delete from t using u where t.id = u.id",
        "delete from t order by id limit 5",
        "delete from t where id = 1 returning id",
        "values (1, 2), (3, 4)",
    ];
    for q in queries {
        roundtrip(q);
    }
}

#[test]
fn ddl_inventory() {
    let queries = [
        "create table t (id int)",
        "create table if not exists t (id int, name varchar(255))",
        "create temporary table t (id int)",
        "create table t (id int primary key, name text not null)",
        "create table t (id serial, price decimal(10, 2) default 0 check (price >= 0))",
        "create table t (id int, constraint pk primary key (id))",
        "create table t (a int, b int, unique (a, b))",
        "create table t (a int, foreign key (a) references u (id) on delete cascade)",
        "create table t (a int references u (id) on delete set null on update restrict)",
        "create table t (a int, b int generated always as (a + 1) stored)",
        "create table t (id int unsigned, v varchar(10) character set utf8 collate utf8_bin)",
        "create table t (tags int[])",
        "create table t (id int) engine = innodb charset = utf8",
        "create table t as select * from u",
        "create index idx on t (a)",
        "create unique index idx on t (a, b)",
        "create index concurrently if not exists idx on t using btree (a desc, b nulls last)",
        "create index idx on t ((a + b))",
        "create index idx on t (a) where a > 0",
        "alter table t add column a int",
        "alter table t add constraint ck check (a > 0)",
        "alter table t drop column a",
        "alter table t drop column if exists a cascade",
        "alter table t drop constraint ck",
        "alter table t rename column a to b",
        "alter table t rename to u",
        "alter table t modify column a varchar(20) not null",
        "alter table t alter column a set default 0",
        "alter table t alter column a set not null",
        "alter table t alter column a drop default",
        "alter table t add column a int, drop column b",
        "drop table t",
        "drop table if exists t1, t2 cascade",
        "drop index idx",
        "drop index concurrently if exists idx on t cascade",
        "truncate table logs",
        "truncate t1, t2 cascade",
        "explain select 1 from t",
        "explain analyze verbose select * from t",
        "explain (analyze, verbose, format json) select 1 from t",
        "analyze select 1 from t",
        "explain insert into t (a) values (1)",
    ];
    for q in queries {
        roundtrip(q);
    }
}

#[test]
fn dialect_lexical_forms() {
    let queries = [
        "select * from #tmp",
        "select * from ##global",
        "select [select] from t",
        "select \"select\" from t",
        "select * from \"user\"",
        "select $tag$dollar quoted$tag$ from t",
        "select $$nested 'quotes'$$ from t",
        "select a from t where b = $2",
    ];
    for q in queries {
        roundtrip(q);
    }
}

#[test]
fn multi_statement_scripts() {
    let stmts = omnisql::parse_all(
        "select 1 from t;\n-- comment between\ninsert into t (a) values (1);;\nupdate t set a = 2",
    )
    .expect("parse_all");
    assert_eq!(stmts.len(), 3);
    for stmt in &stmts {
        let t1 = to_sql(stmt);
        let re = parse(&t1).expect("reparse").expect("statement");
        assert_eq!(t1, to_sql(&re));
    }
}

#[test]
fn comments_do_not_change_meaning() {
    let a = roundtrip("select /* hint */ a from t -- done");
    let b = roundtrip("select a from t");
    assert_eq!(a, b);
}

#[test]
fn bracket_identifier_boundary() {
    // `[x]` is an identifier, `[ x ]` is a subscript.
    assert_eq!(roundtrip("select [x] from t"), "SELECT x FROM t");
    assert_eq!(
        roundtrip("select a[ x ] from t"),
        "SELECT a[ x ] FROM t"
    );
}

#[test]
fn select_into_variants() {
    let queries = [
        "select a into outfile '/tmp/out.csv' from t",
        "select a into @x, @y from t",
    ];
    for q in queries {
        roundtrip(q);
    }
}
